//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the log core from validated configuration
//! - Register the webhooks named in configuration
//!
//! # Design Decisions
//! - A webhook that fails to initialize is reported through the log core
//!   and skipped; the service still starts
//! - Listeners are bound by the caller, after the log core exists

use std::sync::Arc;

use crate::config::AppConfig;
use crate::delivery::WebhookSink;
use crate::logger::{LogError, Logger};

/// Build the logger and register configured webhooks. Must run inside a
/// Tokio runtime.
pub fn bootstrap(config: &AppConfig) -> Result<Logger, LogError> {
    let logger = Logger::new(&config.logging, &config.delivery)?;

    for webhook in &config.logging.webhooks {
        if webhook.url.is_empty() {
            tracing::warn!("Skipping webhook with empty URL");
            continue;
        }

        let sink = Arc::new(WebhookSink::from_config(webhook));
        match logger.add_sink(sink) {
            Ok(id) => {
                tracing::info!(url = %webhook.url, id = %id, "Webhook sink registered");
            }
            Err(e) => {
                logger.error(format_args!(
                    "Failed to register webhook {}: {}",
                    webhook.url, e
                ))?;
            }
        }
    }

    Ok(logger)
}
