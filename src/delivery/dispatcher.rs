//! Bounded, fire-and-forget delivery.
//!
//! # Responsibilities
//! - Accept (sink, entry) jobs from the emitting thread without blocking
//! - Run each delivery as an isolated task with its own timeout
//! - Bound the number of concurrent outbound deliveries
//! - Drain pending work at shutdown within a deadline

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

use crate::config::DeliveryConfig;
use crate::delivery::{DeliveryError, DeliverySink, RegisteredSink};
use crate::entry::Entry;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Called with the sink name when a delivery fails.
pub type FailureHook = Arc<dyn Fn(&str, &DeliveryError) + Send + Sync>;

struct Job {
    sink: Arc<dyn DeliverySink>,
    entry: Arc<Entry>,
}

/// Hands matching entries to delivery tasks.
pub struct Dispatcher {
    tx: mpsc::Sender<Job>,
    accepting: AtomicBool,
    shutdown: Shutdown,
    worker: Mutex<Option<JoinHandle<()>>>,
    drain_timeout: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("accepting", &self.accepting.load(Ordering::Relaxed))
            .field("drain_timeout", &self.drain_timeout)
            .finish()
    }
}

impl Dispatcher {
    /// Start the dispatch loop on `runtime`.
    pub fn start(config: &DeliveryConfig, runtime: &Handle, on_failure: FailureHook) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let shutdown = Shutdown::new();

        let worker = DispatchLoop {
            rx,
            permits: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            timeout: Duration::from_secs(config.timeout_secs),
            on_failure,
            shutdown: shutdown.clone(),
        };
        let handle = runtime.spawn(worker.run());

        Self {
            tx,
            accepting: AtomicBool::new(true),
            shutdown,
            worker: Mutex::new(Some(handle)),
            drain_timeout: Duration::from_secs(config.drain_timeout_secs),
        }
    }

    /// Queue `entry` for every sink in `sinks` whose filter matches it.
    /// Returns the number of deliveries queued.
    pub fn dispatch(&self, sinks: &[RegisteredSink], entry: Arc<Entry>) -> usize {
        if !self.accepting.load(Ordering::Acquire) {
            return 0;
        }

        let mut queued = 0;
        for registered in sinks.iter().filter(|r| r.sink.should_handle(&entry)) {
            let job = Job {
                sink: registered.sink.clone(),
                entry: entry.clone(),
            };
            match self.tx.try_send(job) {
                Ok(()) => queued += 1,
                Err(e) => {
                    let reason = match e {
                        mpsc::error::TrySendError::Full(_) => "queue full",
                        mpsc::error::TrySendError::Closed(_) => "dispatcher stopped",
                    };
                    tracing::warn!(sink = registered.sink.name(), reason, "Dropping log delivery");
                    metrics::record_delivery(registered.sink.name(), "dropped");
                }
            }
        }
        queued
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Stop accepting deliveries and wait for queued ones, up to the drain
    /// timeout. Deliveries still running after that are abandoned.
    pub async fn shutdown(&self) {
        self.accepting.store(false, Ordering::Release);
        self.shutdown.trigger();

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut handle) = handle else { return };

        if tokio::time::timeout(self.drain_timeout, &mut handle).await.is_err() {
            tracing::warn!(
                timeout_secs = self.drain_timeout.as_secs(),
                "Delivery drain timed out, abandoning in-flight deliveries"
            );
            handle.abort();
        }
    }
}

struct DispatchLoop {
    rx: mpsc::Receiver<Job>,
    permits: Arc<Semaphore>,
    timeout: Duration,
    on_failure: FailureHook,
    shutdown: Shutdown,
}

impl DispatchLoop {
    async fn run(mut self) {
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                job = self.rx.recv() => match job {
                    Some(job) => self.spawn(&mut tasks, job).await,
                    None => break,
                },
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
                _ = self.shutdown.wait() => break,
            }
        }

        self.rx.close();
        while let Some(job) = self.rx.recv().await {
            self.spawn(&mut tasks, job).await;
        }
        while tasks.join_next().await.is_some() {}
        tracing::debug!("Delivery dispatcher stopped");
    }

    async fn spawn(&self, tasks: &mut JoinSet<()>, job: Job) {
        // waiting here lets the bounded queue absorb bursts
        let Ok(permit) = self.permits.clone().acquire_owned().await else {
            return;
        };
        let timeout = self.timeout;
        let on_failure = self.on_failure.clone();

        tasks.spawn(async move {
            let _permit = permit;
            let Job { sink, entry } = job;
            let result = match tokio::time::timeout(timeout, sink.deliver(&entry)).await {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Timeout(timeout.as_secs())),
            };

            match result {
                Ok(()) => metrics::record_delivery(sink.name(), "delivered"),
                Err(e) => {
                    metrics::record_delivery(sink.name(), "failed");
                    on_failure(sink.name(), &e);
                }
            }
        });
    }
}
