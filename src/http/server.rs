//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the axum router for the logging endpoints under `/api`
//! - Wire up middleware (request id, tracing, timeout, body limit)
//! - Serve until the shared shutdown signal fires

use std::io;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::handlers;
use crate::lifecycle::Shutdown;
use crate::logger::Logger;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub logger: Logger,
}

/// HTTP surface of the log core.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, logger: Logger) -> Self {
        let router = Self::build_router(config, AppState { logger });
        Self { router }
    }

    /// The fully layered router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .nest("/api", api_routes())
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs))),
            )
    }

    /// Serve on `listener` until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Logging routes, relative to the `/api` prefix. Hosts with their own
/// router can nest these directly.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/loggersettings/debug", post(handlers::set_debug))
        .route(
            "/logging/log",
            get(handlers::get_logs_query).post(handlers::get_logs_body),
        )
        .route("/logging/openapi.json", get(handlers::openapi_document))
        .route("/logs", any(handlers::receive_webhook))
}
