//! Error types for paysec-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use paysec_core::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use serde::Serialize;
use thiserror::Error;

/// Failed request, rendered as `{"message", "code"}`
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Log `error` against `context` and convert it
    pub fn logged(error: CoreError, context: ErrorContext) -> Self {
        DefaultErrorLogger.log_error(&error, &context);
        Self::from_core(error)
    }

    fn from_core(error: CoreError) -> Self {
        let status = StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, error.code().to_string(), error.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        Self::logged(error, ErrorContext::new("request"))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    code: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: &self.message,
            code: &self.code,
        };
        (self.status, Json(body)).into_response()
    }
}
