//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build Logger → Register configured webhooks → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting requests → Drain deliveries → Close sinks
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then the log core, then listeners
//! - Ordered shutdown: stop accept, drain deliveries, close sinks, flush file
//! - Delivery drain has a deadline; whatever is still in flight is abandoned

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
