//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (sizes, queue bounds > 0)
//! - Check that addresses and webhook URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.logging.log_file.trim().is_empty() {
        errors.push(ValidationError::new("logging.log_file", "must not be empty"));
    }
    if config.logging.rotation.max_size_mb == 0 {
        errors.push(ValidationError::new("logging.rotation.max_size_mb", "must be greater than 0"));
    }

    for (i, webhook) in config.logging.webhooks.iter().enumerate() {
        // empty URLs are skipped at registration time, not rejected
        if webhook.url.is_empty() {
            continue;
        }
        if let Err(e) = url::Url::parse(&webhook.url) {
            errors.push(ValidationError::new(
                format!("logging.webhooks[{}].url", i),
                format!("invalid URL '{}': {}", webhook.url, e),
            ));
        }
    }

    if config.delivery.queue_capacity == 0 {
        errors.push(ValidationError::new("delivery.queue_capacity", "must be greater than 0"));
    }
    if config.delivery.max_in_flight == 0 {
        errors.push(ValidationError::new("delivery.max_in_flight", "must be greater than 0"));
    }
    if config.delivery.timeout_secs == 0 {
        errors.push(ValidationError::new("delivery.timeout_secs", "must be greater than 0"));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("invalid socket address '{}'", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::WebhookConfig;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.logging.rotation.max_size_mb = 0;
        config.delivery.queue_capacity = 0;
        config.server.bind_address = "nowhere".into();
        config.logging.webhooks.push(WebhookConfig {
            url: "not a url".into(),
            ..Default::default()
        });
        config.logging.webhooks.push(WebhookConfig::default());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "logging.rotation.max_size_mb",
                "logging.webhooks[0].url",
                "delivery.queue_capacity",
                "server.bind_address",
            ]
        );
    }
}
