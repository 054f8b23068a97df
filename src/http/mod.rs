//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! request
//!     → request id + trace span + timeout + body limit
//!     → /api/loggersettings/debug  → Logger::set_debug
//!     → /api/logging/log           → LogQuery → LogRetriever → encoded body
//!     → /api/logs                  → tracing only (development receiver)
//!     → /api/logging/openapi.json  → static document
//! ```
//!
//! # Design Decisions
//! - Unsupported methods get 405 from axum's method routing
//! - Authentication belongs to the host application's middleware
//! - File scans run on the blocking pool

pub mod error;
pub mod handlers;
pub mod openapi;
pub mod server;

pub use error::ApiError;
pub use handlers::DebugSettings;
pub use server::{api_routes, AppState, HttpServer};
