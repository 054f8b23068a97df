//! Registry of active delivery sinks.
//!
//! # Responsibilities
//! - Initialize sinks before they become visible to emission
//! - Publish an immutable snapshot of the current sink set
//! - Close sinks on removal
//!
//! # Design Decisions
//! - Readers load the snapshot through `ArcSwap` and never block
//! - Writers (register/remove) serialize on a mutex and swap in a new list
//! - Network I/O never happens while the write lock is held

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::delivery::{DeliveryError, DeliverySink, SinkId};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to initialize sink: {0}")]
    Initialize(#[source] DeliveryError),

    #[error("failed to close sink: {0}")]
    Close(#[source] DeliveryError),

    #[error("sink {0} not found")]
    NotFound(SinkId),
}

/// A sink together with its registration id.
#[derive(Debug, Clone)]
pub struct RegisteredSink {
    pub id: SinkId,
    pub sink: Arc<dyn DeliverySink>,
}

#[derive(Debug, Default)]
pub struct SinkRegistry {
    sinks: ArcSwap<Vec<RegisteredSink>>,
    write_lock: Mutex<()>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize `sink` and add it to the active set.
    pub fn register(&self, sink: Arc<dyn DeliverySink>) -> Result<SinkId, RegistryError> {
        sink.initialize().map_err(RegistryError::Initialize)?;

        let id = SinkId::new();
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::clone(&self.sinks.load());
        tracing::info!(sink = sink.name(), id = %id, "Registered delivery sink");
        next.push(RegisteredSink { id, sink });
        self.sinks.store(Arc::new(next));
        Ok(id)
    }

    /// Close and remove the sink registered under `id`.
    ///
    /// A sink whose `close` fails stays registered.
    pub fn remove(&self, id: SinkId) -> Result<Arc<dyn DeliverySink>, RegistryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.sinks.load_full();
        let index = current
            .iter()
            .position(|r| r.id == id)
            .ok_or(RegistryError::NotFound(id))?;

        let removed = current[index].sink.clone();
        removed.close().map_err(RegistryError::Close)?;

        let mut next = Vec::clone(&current);
        next.remove(index);
        self.sinks.store(Arc::new(next));
        tracing::info!(sink = removed.name(), id = %id, "Removed delivery sink");
        Ok(removed)
    }

    /// Current sink set. Cheap; safe to hold across await points.
    pub fn snapshot(&self) -> Arc<Vec<RegisteredSink>> {
        self.sinks.load_full()
    }

    pub fn len(&self) -> usize {
        self.sinks.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.load().is_empty()
    }

    /// Remove and close every sink, reporting close failures.
    pub fn close_all(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let drained = self.sinks.swap(Arc::new(Vec::new()));
        for registered in drained.iter() {
            if let Err(e) = registered.sink.close() {
                tracing::warn!(sink = registered.sink.name(), error = %e, "Failed to close delivery sink");
            }
        }
    }
}
