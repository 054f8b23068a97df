//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (tracing diagnostics: lifecycle, dropped deliveries)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stderr/stdout via tracing-subscriber
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
