//! Delivery sink contract.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::delivery::DeliveryError;
use crate::entry::{Entry, Filter};

/// Boxed future returned by [`DeliverySink::deliver`].
pub type DeliveryFuture<'a> = Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>>;

/// Identity of a registered sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SinkId(Uuid);

impl SinkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SinkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A pluggable target that receives entries matching its filter.
///
/// Lifecycle: `initialize` (validate) → `deliver` any number of times →
/// `close` (release held resources).
pub trait DeliverySink: Send + Sync + fmt::Debug {
    /// Short label used in diagnostics and metrics.
    fn name(&self) -> &str;

    fn filter(&self) -> &Filter;

    /// Validate configuration. A failure prevents registration.
    fn initialize(&self) -> Result<(), DeliveryError> {
        Ok(())
    }

    fn should_handle(&self, entry: &Entry) -> bool {
        self.filter().matches(entry)
    }

    /// Deliver one entry. Called concurrently from delivery tasks.
    fn deliver<'a>(&'a self, entry: &'a Entry) -> DeliveryFuture<'a>;

    fn close(&self) -> Result<(), DeliveryError> {
        Ok(())
    }
}
