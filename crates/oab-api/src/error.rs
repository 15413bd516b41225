//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every error response has the body `{"error": {"code", "message"}}`.
//! Internal error details are logged, never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oab_schema::{BuildError, ManifestError, RouteError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Failure to set up documentation serving: the page template or a
/// document snapshot.
#[derive(Error, Debug)]
pub enum DocsError {
    /// The documented routes could not be registered.
    #[error("route registration failed: {0}")]
    Route(#[from] RouteError),

    /// The manifest could not be loaded or built.
    #[error("manifest failed: {0}")]
    Manifest(#[from] ManifestError),

    /// The conversion pass was aborted.
    #[error("document build failed: {0}")]
    Build(#[from] BuildError),

    /// The UI page template did not compile.
    #[error("page template failed: {0}")]
    Template(#[from] handlebars::TemplateError),
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oab_core::HttpMethod;

    #[test]
    fn not_found_status_code() {
        let (status, code) = AppError::NotFound("/nope".to_string()).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn internal_status_code() {
        let (status, code) = AppError::Internal("boom".to_string()).status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
    }

    #[test]
    fn internal_message_is_hidden() {
        let response = AppError::Internal("secret path /etc/x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn docs_error_names_the_failed_phase() {
        let err = DocsError::Route(RouteError::DuplicateOperation {
            method: HttpMethod::Get,
            path: "/a".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "route registration failed: operation GET /a is already registered"
        );
    }
}
