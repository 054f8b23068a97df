//! Request handlers for the logging endpoints.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::delivery::webhook::API_KEY_HEADER;
use crate::http::error::ApiError;
use crate::http::openapi;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::retrieval::{encode, Encoded, LogQuery, LogRetriever, QueryParams};

/// Body of `POST /loggersettings/debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugSettings {
    pub enabled: bool,
}

pub async fn set_debug(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DebugSettings>, ApiError> {
    let settings: DebugSettings = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid request body".to_string()))?;

    state.logger.set_debug(settings.enabled);
    if let Err(e) = state.logger.info(format_args!("Debug logging set to: {}", settings.enabled)) {
        tracing::warn!(error = %e, "Failed to record debug toggle");
    }

    Ok(Json(settings))
}

/// `GET /logging/log` with query-string parameters.
pub async fn get_logs_query(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Response {
    let query = LogQuery::from_params(&params).map_err(ApiError::from);
    respond(&state, query).await
}

/// `POST /logging/log` with a JSON body.
pub async fn get_logs_body(State(state): State<AppState>, body: Bytes) -> Response {
    let query = serde_json::from_slice::<LogQuery>(&body)
        .map_err(|_| ApiError::BadRequest("Invalid request body".to_string()));
    respond(&state, query).await
}

async fn respond(state: &AppState, query: Result<LogQuery, ApiError>) -> Response {
    let mut format = "unknown";
    let result = async {
        let normalized = query?.normalize(Utc::now())?;
        format = normalized.format.as_str();

        let retriever = LogRetriever::new(state.logger.log_file());
        let lines = tokio::task::spawn_blocking(move || retriever.select(normalized.selection))
            .await
            .map_err(|e| ApiError::Internal(format!("Log scan aborted: {}", e)))??;

        Ok::<_, ApiError>(encode(lines, normalized.format)?)
    }
    .await;

    let response = match result {
        Ok(encoded) => encoded_response(encoded),
        Err(e) => e.into_response(),
    };
    metrics::record_query(format, response.status().as_u16());
    response
}

fn encoded_response(encoded: Encoded) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(encoded.content_type));
    if let Some(filename) = encoded.attachment {
        if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename={}", filename)) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }
    (StatusCode::OK, headers, encoded.body).into_response()
}

/// Development receiver for outbound webhooks. Accepts anything and records
/// it in the service diagnostics only, never in the log file, so a sink
/// pointed here cannot loop.
pub async fn receive_webhook(method: Method, headers: HeaderMap, body: Bytes) -> StatusCode {
    let authenticated = headers.contains_key(API_KEY_HEADER);
    tracing::info!(
        method = %method,
        authenticated,
        bytes = body.len(),
        body = %String::from_utf8_lossy(&body),
        "Webhook received"
    );
    StatusCode::OK
}

pub async fn openapi_document() -> Json<serde_json::Value> {
    Json(openapi::document())
}
