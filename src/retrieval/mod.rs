//! Retrieval service.
//!
//! # Data Flow
//! ```text
//! HTTP query params / JSON body
//!     → LogQuery (request.rs)
//!     → normalize(now) → Selection::Tail | Selection::Range
//!     → scan.rs over a fresh read-only handle on the active file
//!     → encode.rs (json | jsonpretty | csv | text)
//! ```
//!
//! # Design Decisions
//! - No state: every request opens the file, scans it once and drops it
//! - No lock shared with the writer; a scan sees whatever was flushed
//!   when it read that far
//! - Retired segments are not searched

pub mod encode;
pub mod request;
pub mod scan;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use thiserror::Error;

pub use encode::{encode, Encoded, LogLines};
pub use request::{LogQuery, NormalizedQuery, OutputFormat, QueryParams, Selection};

#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Malformed request parameters.
    #[error("{0}")]
    Validation(String),

    #[error("Failed to open log file: {0}")]
    Open(#[source] io::Error),

    #[error("Error reading log file: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to encode response: {0}")]
    Csv(#[from] csv::Error),
}

impl RetrievalError {
    /// True for errors caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Answers retrieval queries against one log file.
#[derive(Debug, Clone)]
pub struct LogRetriever {
    path: PathBuf,
}

impl LogRetriever {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Select the lines a normalized query asks for.
    pub fn select(&self, selection: Selection) -> Result<Vec<String>, RetrievalError> {
        let file = File::open(&self.path).map_err(RetrievalError::Open)?;
        let reader = BufReader::new(file);

        let lines = match selection {
            Selection::Tail(n) => scan::tail_lines(reader, n),
            Selection::Range { from, to } => {
                scan::range_lines(reader, from, to, Local::now().date_naive())
            }
        };
        lines.map_err(RetrievalError::Read)
    }

    /// Normalize, select and encode in one pass.
    pub fn retrieve(&self, query: &LogQuery, now: DateTime<Utc>) -> Result<Encoded, RetrievalError> {
        let normalized = query.normalize(now)?;
        let lines = self.select(normalized.selection)?;
        encode(lines, normalized.format)
    }
}
