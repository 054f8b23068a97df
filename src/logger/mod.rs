//! Log core.
//!
//! # Data Flow
//! ```text
//! debug!/info!/warn!/error!/fatal! (or Logger::log)
//!     → level gate (DEBUG dropped unless debug mode, before formatting)
//!     → Entry { timestamp, level, message, call site (DEBUG only), fields }
//!     → LogWriter (mutex) → RotatingFile (+ console mirror)
//!     → SinkRegistry snapshot → Dispatcher (fire-and-forget)
//! ```
//!
//! # Design Decisions
//! - `Logger` is a cheap `Clone` handle passed explicitly to collaborators;
//!   `global` offers an optional install-once slot with a checked `get`
//! - The durable write is the only fallible step visible to callers
//! - Delivery failures are written to the file at ERROR but never
//!   re-dispatched, so a failing sink cannot feed on its own reports

pub mod error;
pub mod format;
pub mod global;
mod macros;
pub mod writer;

use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::{DeliveryConfig, LoggingConfig};
use crate::delivery::{DeliveryError, DeliverySink, Dispatcher, FailureHook, SinkId, SinkRegistry};
use crate::entry::{Entry, Fields, Level};
use crate::observability::metrics;
use crate::rotation::{RotatingFile, RotationPolicy};

pub use error::LogError;
pub use writer::{Console, LogWriter};

struct Core {
    writer: Arc<LogWriter>,
    debug: AtomicBool,
    registry: SinkRegistry,
    dispatcher: Dispatcher,
}

/// Handle to the log core. Clones share the same file, sinks and debug flag.
#[derive(Clone)]
pub struct Logger {
    core: Arc<Core>,
    fields: Arc<Fields>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("log_file", &self.log_file())
            .field("debug", &self.is_debug())
            .field("sinks", &self.core.registry.len())
            .field("fields", &self.fields)
            .finish()
    }
}

impl Logger {
    /// Build a logger from configuration, mirroring to stdout when
    /// `log_to_stdout` is set. Must be called within a Tokio runtime.
    pub fn new(config: &LoggingConfig, delivery: &DeliveryConfig) -> Result<Self, LogError> {
        let console: Option<Console> = if config.log_to_stdout {
            Some(Box::new(io::stdout()))
        } else {
            None
        };
        Self::with_console(config, delivery, console)
    }

    /// Build a logger with an explicit console mirror.
    pub fn with_console(
        config: &LoggingConfig,
        delivery: &DeliveryConfig,
        console: Option<Console>,
    ) -> Result<Self, LogError> {
        let runtime = Handle::try_current().map_err(|_| LogError::NoRuntime)?;

        let policy = RotationPolicy::from_config(&config.log_file, &config.rotation);
        let writer = Arc::new(LogWriter::new(RotatingFile::open(policy)?, console));
        let dispatcher = Dispatcher::start(delivery, &runtime, failure_reporter(writer.clone()));

        Ok(Self {
            core: Arc::new(Core {
                writer,
                debug: AtomicBool::new(config.debug),
                registry: SinkRegistry::new(),
                dispatcher,
            }),
            fields: Arc::new(Fields::new()),
        })
    }

    /// Emit a DEBUG entry with the caller's location. Dropped before any
    /// formatting unless debug mode is on.
    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        if !self.is_debug() {
            return Ok(());
        }
        self.emit(Level::Debug, args, Some(Location::caller()))
    }

    pub fn info(&self, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        self.emit(Level::Info, args, None)
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        self.emit(Level::Warn, args, None)
    }

    pub fn error(&self, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        self.emit(Level::Error, args, None)
    }

    /// Emit a FATAL entry and terminate the process with status 1.
    pub fn fatal(&self, args: fmt::Arguments<'_>) -> ! {
        if let Err(e) = self.emit(Level::Fatal, args, None) {
            let _ = writeln!(io::stderr(), "failed to persist fatal log entry: {}", e);
        }
        let _ = self.core.writer.flush();
        std::process::exit(1)
    }

    /// Emit at an arbitrary level. FATAL is logged without exiting.
    #[track_caller]
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) -> Result<(), LogError> {
        match level {
            Level::Debug => self.debug(args),
            level => self.emit(level, args, None),
        }
    }

    pub fn set_debug(&self, enabled: bool) {
        self.core.debug.store(enabled, Ordering::Relaxed);
    }

    pub fn is_debug(&self) -> bool {
        self.core.debug.load(Ordering::Relaxed)
    }

    /// A handle whose entries carry `fields` in addition to any fields this
    /// handle already carries. Later keys win.
    pub fn with_fields(&self, fields: Fields) -> Logger {
        let mut merged = Fields::clone(&self.fields);
        merged.extend(fields);
        Logger {
            core: self.core.clone(),
            fields: Arc::new(merged),
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Path of the active log file.
    pub fn log_file(&self) -> &Path {
        self.core.writer.path()
    }

    /// Initialize and register a delivery sink.
    pub fn add_sink(&self, sink: Arc<dyn DeliverySink>) -> Result<SinkId, LogError> {
        Ok(self.core.registry.register(sink)?)
    }

    /// Close and unregister a delivery sink.
    pub fn remove_sink(&self, id: SinkId) -> Result<(), LogError> {
        self.core.registry.remove(id)?;
        Ok(())
    }

    pub fn sinks(&self) -> &SinkRegistry {
        &self.core.registry
    }

    /// Drain pending deliveries, close every sink and flush the file.
    pub async fn shutdown(&self) -> Result<(), LogError> {
        self.core.dispatcher.shutdown().await;
        self.core.registry.close_all();
        self.core.writer.flush()?;
        let writer = Arc::clone(&self.core.writer);
        if tokio::task::spawn_blocking(move || writer.settle()).await.is_err() {
            tracing::warn!("Log maintenance did not settle before shutdown");
        }
        Ok(())
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>, location: Option<&Location<'_>>) -> Result<(), LogError> {
        let message = match args.as_str() {
            Some(s) => s.to_string(),
            None => fmt::format(args),
        };

        let mut entry = Entry::new(level, message).with_fields(Fields::clone(&self.fields));
        if let Some(location) = location {
            entry = entry.with_source(location.file(), location.line());
        }

        self.core.writer.write_entry(&entry)?;
        metrics::record_entry(level);

        let sinks = self.core.registry.snapshot();
        if !sinks.is_empty() {
            self.core.dispatcher.dispatch(&sinks, Arc::new(entry));
        }
        Ok(())
    }
}

/// Writes delivery failures straight to the file, bypassing dispatch.
fn failure_reporter(writer: Arc<LogWriter>) -> FailureHook {
    Arc::new(move |sink: &str, error: &DeliveryError| {
        let entry = Entry::new(Level::Error, format!("Sink {} delivery failed: {}", sink, error));
        if let Err(e) = writer.write_entry(&entry) {
            tracing::error!(sink, error = %e, "Failed to record delivery failure");
        }
    })
}
