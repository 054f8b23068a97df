//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpListener;

use logrelay::config::{DeliveryConfig, LoggingConfig, ServerConfig};
use logrelay::{HttpServer, Logger, Shutdown};

/// One request captured by a mock webhook.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<RecordedRequest>>>);

impl Recorder {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Start a mock webhook on an ephemeral port. Every request is recorded,
/// then answered with `status` after `delay`.
pub async fn start_recording_webhook(status: u16, delay: Duration) -> (SocketAddr, Recorder) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorder = Recorder::default();
    let seen = recorder.clone();

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else { break };
            let seen = seen.clone();
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut reader = BufReader::new(read);
                let Some(request) = read_request(&mut reader).await else { return };
                seen.0.lock().unwrap().push(request);

                tokio::time::sleep(delay).await;
                let status_text = match status {
                    200 => "200 OK",
                    400 => "400 Bad Request",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    status_text
                );
                let _ = write.write_all(response.as_bytes()).await;
                let _ = write.shutdown().await;
            });
        }
    });

    (addr, recorder)
}

async fn read_request(reader: &mut BufReader<OwnedReadHalf>) -> Option<RecordedRequest> {
    let mut line = String::new();
    reader.read_line(&mut line).await.ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = HashMap::new();
    loop {
        line.clear();
        reader.read_line(&mut line).await.ok()?;
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).await.ok()?;

    Some(RecordedRequest { method, path, headers, body })
}

pub fn logging_config(dir: &Path) -> LoggingConfig {
    LoggingConfig {
        log_file: dir.join("app.log").to_string_lossy().into_owned(),
        log_to_stdout: false,
        ..Default::default()
    }
}

pub fn delivery_config() -> DeliveryConfig {
    DeliveryConfig {
        timeout_secs: 2,
        drain_timeout_secs: 5,
        ..Default::default()
    }
}

pub fn test_logger(dir: &Path) -> Logger {
    Logger::new(&logging_config(dir), &delivery_config()).unwrap()
}

pub fn read_log(logger: &Logger) -> String {
    std::fs::read_to_string(logger.log_file()).unwrap()
}

/// Serve the logging API for `logger` on an ephemeral port.
pub async fn start_server(logger: Logger) -> (String, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(&ServerConfig::default(), logger);
    tokio::spawn(server.run(listener, shutdown.clone()));

    (format!("http://{}", addr), shutdown)
}
