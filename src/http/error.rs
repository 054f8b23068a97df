//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::retrieval::RetrievalError;

/// Errors surfaced to API clients as plain-text bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body or parameters (400).
    #[error("{0}")]
    BadRequest(String),

    /// File or encoding failure on the server side (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RetrievalError> for ApiError {
    fn from(e: RetrievalError) -> Self {
        if e.is_client_error() {
            Self::BadRequest(e.to_string())
        } else {
            Self::Internal(e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Rejected request");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_errors_map_to_status() {
        let bad: ApiError = RetrievalError::Validation("Invalid format".into()).into();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let internal: ApiError = RetrievalError::Open(io).into();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(internal.to_string().starts_with("Failed to open log file"));
    }
}
