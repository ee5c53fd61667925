// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the HTTP layer.

use crate::comment::CommentError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Too many requests")]
    RateLimited { retry_after: Duration },

    #[error("{0}")]
    InvalidComment(#[from] CommentError),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidComment(_) | Self::InvalidBody(_) | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::InvalidComment(err) => err.code(),
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Metrics(_) => "INTERNAL",
        }
    }
}

/// Whole seconds until `retry_after` has passed, rounded up.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
            retry_after_secs: None,
        };

        match self {
            Self::RateLimited { retry_after } => {
                let secs = retry_after_secs(retry_after);
                (
                    status,
                    [(header::RETRY_AFTER, secs.to_string())],
                    Json(ErrorResponse {
                        retry_after_secs: Some(secs),
                        ..body
                    }),
                )
                    .into_response()
            }
            _ => (status, Json(body)).into_response(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
