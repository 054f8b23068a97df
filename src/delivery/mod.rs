//! Delivery subsystem.
//!
//! # Data Flow
//! ```text
//! Logger emission (after the durable write)
//!     → SinkRegistry::snapshot (lock-free read)
//!     → DeliverySink::should_handle per sink
//!     → Dispatcher::dispatch (bounded queue, never blocks)
//!     → delivery task per (sink, entry), bounded by max_in_flight
//!     → DeliverySink::deliver (e.g. webhook POST)
//!     → failures reported to the log file, never to the emitting caller
//! ```
//!
//! # Design Decisions
//! - Best-effort: no retries, no ordering across sinks, no durability
//! - A full queue drops the delivery instead of slowing emission down
//! - Shutdown drains the queue with a deadline and abandons the rest

pub mod dispatcher;
pub mod registry;
pub mod sink;
pub mod webhook;

use thiserror::Error;

pub use dispatcher::{Dispatcher, FailureHook};
pub use registry::{RegisteredSink, RegistryError, SinkRegistry};
pub use sink::{DeliveryFuture, DeliverySink, SinkId};
pub use webhook::WebhookSink;

/// Errors raised by a delivery sink.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Sink configuration rejected during initialization.
    #[error("invalid sink configuration: {0}")]
    InvalidConfig(String),

    /// Entry could not be serialized.
    #[error("failed to encode log entry: {0}")]
    Encode(#[from] serde_json::Error),

    /// Network failure reaching the target.
    #[error("failed to send: {0}")]
    Transport(String),

    /// Target answered with a non-success status.
    #[error("request failed with status {0}")]
    Status(u16),

    /// Delivery exceeded its time budget.
    #[error("timed out after {0} seconds")]
    Timeout(u64),

    /// Sink was closed before the delivery ran.
    #[error("sink is closed")]
    Closed,
}
