//! Outbound webhook sink.
//!
//! # Responsibilities
//! - Validate the target URL on initialization
//! - POST each matching entry as JSON with the `X-API-Key` header
//! - Treat transport errors and non-success statuses as dropped deliveries

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::header::CONTENT_TYPE;

use crate::config::WebhookConfig;
use crate::delivery::{DeliveryError, DeliveryFuture, DeliverySink};
use crate::entry::{Entry, Filter};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Forwards entries to an HTTP endpoint.
#[derive(Debug)]
pub struct WebhookSink {
    name: String,
    url: String,
    api_key: String,
    filter: Filter,
    client: reqwest::Client,
    closed: AtomicBool,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, filter: Filter) -> Self {
        let url = url.into();
        let name = match url::Url::parse(&url) {
            Ok(parsed) => match (parsed.host_str(), parsed.port()) {
                (Some(host), Some(port)) => format!("webhook:{}:{}", host, port),
                (Some(host), None) => format!("webhook:{}", host),
                _ => "webhook".to_string(),
            },
            Err(_) => "webhook".to_string(),
        };

        Self {
            name,
            url,
            api_key: api_key.into(),
            filter,
            client: reqwest::Client::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &WebhookConfig) -> Self {
        Self::new(config.url.clone(), config.api_key.clone(), config.filter.clone())
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, pooling).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, entry: &Entry) -> Result<(), DeliveryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DeliveryError::Closed);
        }

        let payload = serde_json::to_vec(entry)?;
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .body(payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }
        Ok(())
    }
}

impl DeliverySink for WebhookSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn filter(&self) -> &Filter {
        &self.filter
    }

    fn initialize(&self) -> Result<(), DeliveryError> {
        if self.url.is_empty() {
            return Err(DeliveryError::InvalidConfig("webhook URL is required".into()));
        }
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| DeliveryError::InvalidConfig(format!("invalid webhook URL '{}': {}", self.url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(DeliveryError::InvalidConfig(format!(
                "unsupported webhook scheme '{}'",
                other
            ))),
        }
    }

    fn deliver<'a>(&'a self, entry: &'a Entry) -> DeliveryFuture<'a> {
        Box::pin(self.post(entry))
    }

    fn close(&self) -> Result<(), DeliveryError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Level;

    #[test]
    fn test_initialize_validates_url() {
        assert!(matches!(
            WebhookSink::new("", "k", Filter::default()).initialize(),
            Err(DeliveryError::InvalidConfig(_))
        ));
        assert!(WebhookSink::new("not a url", "k", Filter::default()).initialize().is_err());
        assert!(WebhookSink::new("ftp://example.com/x", "k", Filter::default()).initialize().is_err());
        assert!(WebhookSink::new("http://127.0.0.1:9000/hook", "k", Filter::default()).initialize().is_ok());
    }

    #[test]
    fn test_name_uses_host() {
        let sink = WebhookSink::new("http://127.0.0.1:9000/hook", "k", Filter::default());
        assert_eq!(sink.name(), "webhook:127.0.0.1:9000");
    }

    #[tokio::test]
    async fn test_closed_sink_refuses_delivery() {
        let sink = WebhookSink::new("http://127.0.0.1:9/hook", "k", Filter::default());
        sink.close().unwrap();
        let entry = Entry::new(Level::Info, "hello");
        assert!(matches!(sink.deliver(&entry).await, Err(DeliveryError::Closed)));
    }

    #[tokio::test]
    async fn test_unreachable_target_is_transport_error() {
        // port 9 (discard) is not expected to be listening locally
        let sink = WebhookSink::new("http://127.0.0.1:9/hook", "k", Filter::default());
        let entry = Entry::new(Level::Error, "boom");
        assert!(matches!(sink.deliver(&entry).await, Err(DeliveryError::Transport(_))));
    }
}
