// src/api/error.rs

//! Mapping of [`AppError`] onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::AppError;

/// JSON error body: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl AppError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::Decode { .. } | AppError::InvalidPath(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::InvalidBody(_) | AppError::InvalidQuery(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::UpstreamUnavailable(_) | AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Integrity { .. }
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Toml(_)
            | AppError::Url(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            if self.is_upstream() {
                log::warn!("{}", self);
            } else {
                log::error!("{}", self);
            }
        } else {
            log::debug!("{}: {}", status, self);
        }

        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
