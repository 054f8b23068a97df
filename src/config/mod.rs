//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to Logger, Dispatcher and HttpServer at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; runtime changes go through the API
//!   (debug toggle, sink registration)
//! - All fields have defaults to allow minimal or absent configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, ConfigNotice, LoadedConfig};
pub use schema::AppConfig;
pub use schema::DeliveryConfig;
pub use schema::LoggingConfig;
pub use schema::ObservabilityConfig;
pub use schema::RotationConfig;
pub use schema::ServerConfig;
pub use schema::WebhookConfig;
