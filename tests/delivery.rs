//! End-to-end delivery through the logger to mock webhooks.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use logrelay::delivery::WebhookSink;
use logrelay::{Entry, Filter};

use common::{read_log, start_recording_webhook, test_logger};

#[tokio::test]
async fn test_webhook_receives_matching_entries() {
    let dir = tempfile::tempdir().unwrap();
    let logger = test_logger(dir.path());
    let (addr, recorder) = start_recording_webhook(200, Duration::ZERO).await;

    let filter = Filter { levels: vec!["error".into()], ..Default::default() };
    logger
        .add_sink(Arc::new(WebhookSink::new(format!("http://{}/api/logs", addr), "secret", filter)))
        .unwrap();

    logger.info(format_args!("routine")).unwrap();
    logger.error(format_args!("database unreachable")).unwrap();
    logger.shutdown().await.unwrap();

    let requests = recorder.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/logs");
    assert_eq!(request.headers.get("x-api-key").map(String::as_str), Some("secret"));
    assert_eq!(request.headers.get("content-type").map(String::as_str), Some("application/json"));

    let entry: Entry = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(entry.message, "database unreachable");
    assert_eq!(request.json()["level"], "ERROR");
}

#[tokio::test]
async fn test_structured_fields_reach_the_webhook() {
    let dir = tempfile::tempdir().unwrap();
    let logger = test_logger(dir.path());
    let (addr, recorder) = start_recording_webhook(200, Duration::ZERO).await;

    let mut field_match = std::collections::BTreeMap::new();
    field_match.insert("tenant".to_string(), serde_json::json!("acme"));
    let filter = Filter { field_match, ..Default::default() };
    logger
        .add_sink(Arc::new(WebhookSink::new(format!("http://{}/hook", addr), "k", filter)))
        .unwrap();

    let mut fields = logrelay::Fields::new();
    fields.insert("tenant".into(), serde_json::json!("acme"));
    logger.with_fields(fields).warn(format_args!("quota at 90%")).unwrap();
    logger.warn(format_args!("no tenant")).unwrap();
    logger.shutdown().await.unwrap();

    let requests = recorder.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].json()["fields"]["tenant"], "acme");
    assert!(read_log(&logger).contains("[WARN] quota at 90% tenant=acme"));
}

#[tokio::test]
async fn test_failed_delivery_is_logged_once() {
    let dir = tempfile::tempdir().unwrap();
    let logger = test_logger(dir.path());
    let (addr, recorder) = start_recording_webhook(500, Duration::ZERO).await;

    logger
        .add_sink(Arc::new(WebhookSink::new(format!("http://{}/hook", addr), "k", Filter::default())))
        .unwrap();

    logger.warn(format_args!("first")).unwrap();
    logger.shutdown().await.unwrap();

    // the failure report itself is never delivered
    assert_eq!(recorder.len(), 1);

    let log = read_log(&logger);
    let failures: Vec<&str> = log.lines().filter(|l| l.contains("delivery failed")).collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("[ERROR] Sink webhook:127.0.0.1:"));
    assert!(failures[0].ends_with("request failed with status 500"));
}

#[tokio::test]
async fn test_slow_webhook_does_not_block_emission() {
    let dir = tempfile::tempdir().unwrap();
    let logger = test_logger(dir.path());
    let (addr, recorder) = start_recording_webhook(200, Duration::from_millis(500)).await;

    logger
        .add_sink(Arc::new(WebhookSink::new(format!("http://{}/hook", addr), "k", Filter::default())))
        .unwrap();

    let started = Instant::now();
    for i in 0..5 {
        logger.info(format_args!("event {}", i)).unwrap();
    }
    assert!(started.elapsed() < Duration::from_millis(250));
    assert_eq!(read_log(&logger).lines().count(), 5);

    logger.shutdown().await.unwrap();
    assert_eq!(recorder.len(), 5);
}

#[tokio::test]
async fn test_unreachable_webhook_does_not_fail_emission() {
    let dir = tempfile::tempdir().unwrap();
    let logger = test_logger(dir.path());

    // bind then drop to get a port nobody listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    logger
        .add_sink(Arc::new(WebhookSink::new(
            format!("http://127.0.0.1:{}/hook", port),
            "k",
            Filter::default(),
        )))
        .unwrap();

    assert!(logger.error(format_args!("still persisted")).is_ok());
    logger.shutdown().await.unwrap();

    let log = read_log(&logger);
    assert!(log.contains("[ERROR] still persisted"));
    assert!(log.contains("delivery failed: failed to send"));
}
