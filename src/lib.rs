//! logrelay: a logging core with rotating file persistence, filtered
//! webhook delivery and an HTTP retrieval surface.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller ──▶ Logger ──▶ LogWriter ──▶ RotatingFile (+ console)
//!                │
//!                └──▶ SinkRegistry snapshot ──▶ Dispatcher ──▶ WebhookSink ──▶ POST
//!
//!   HTTP ──▶ /api/logging/log ──▶ LogRetriever ──▶ tail | range scan ──▶ encoder
//!        ──▶ /api/loggersettings/debug ──▶ Logger::set_debug
//! ```

pub mod config;
pub mod delivery;
pub mod entry;
pub mod http;
pub mod lifecycle;
pub mod logger;
pub mod observability;
pub mod retrieval;
pub mod rotation;

pub use config::AppConfig;
pub use entry::{Entry, Fields, Filter, Level};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use logger::{LogError, Logger};
