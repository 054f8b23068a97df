//! Entry model.
//!
//! # Data Flow
//! ```text
//! Logger emission
//!     → Entry (immutable, shared as Arc<Entry>)
//!     → formatted line (logger::format)
//!     → Filter::matches per registered sink (delivery)
//! ```
//!
//! # Design Decisions
//! - Entries are never mutated after construction; fan-out shares one `Arc`
//! - Filters are plain data so they can be loaded straight from config
//! - Matching is a pure function of (entry, filter)

pub mod filter;
pub mod level;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use filter::Filter;
pub use level::{Level, ParseLevelError};

/// Structured field map carried by an entry.
pub type Fields = Map<String, Value>;

/// One logged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Emission instant.
    pub timestamp: DateTime<Utc>,

    pub level: Level,

    /// Fully formatted message.
    pub message: String,

    /// Call-site file, captured only for DEBUG entries in debug mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Fields,
}

impl Entry {
    /// Create an entry stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::at(Utc::now(), level, message)
    }

    /// Create an entry with an explicit timestamp.
    pub fn at(timestamp: DateTime<Utc>, level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
            source: None,
            line: None,
            fields: Fields::new(),
        }
    }

    /// Attach a call-site location.
    pub fn with_source(mut self, source: impl Into<String>, line: u32) -> Self {
        self.source = Some(source.into());
        self.line = Some(line);
        self
    }

    /// Attach structured fields.
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// Whether this entry satisfies `filter`.
    pub fn matches(&self, filter: &Filter) -> bool {
        filter.matches(self)
    }
}
