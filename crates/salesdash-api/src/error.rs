//! Error types for salesdash-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use salesdash_core::{CoreError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error")]
    InternalError,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(e) => match e.code() {
                ErrorCode::CustomerNotFound
                | ErrorCode::EmployeeNotFound
                | ErrorCode::ProductNotFound
                | ErrorCode::SaleNotFound
                | ErrorCode::UserNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ValidationError | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
                ErrorCode::DuplicateEntry => StatusCode::CONFLICT,
                ErrorCode::Unauthorized => StatusCode::FORBIDDEN,
                ErrorCode::StoreError | ErrorCode::InternalError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(e) => serde_json::json!({ "error": e.to_details() }),
            other => serde_json::json!({
                "error": { "code": "API_ERROR", "message": other.to_string() }
            }),
        };
        if status.is_server_error() {
            log::error!("request failed: {}", self);
        }
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

// ==================== Tests ====================
