//! HTTP error mapping.
//!
//! Every handler failure becomes a JSON body `{"error": "..."}` with the
//! status dictated by the error taxonomy. Nothing here crashes the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::registry::RegistryError;
use crate::service::ServiceError;
use crate::store::StoreError;

/// Request-boundary error type for all API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Too many login attempts, please try again later.")]
    RateLimited,

    #[error("{0}")]
    Validation(String),

    #[error("Proxy not found")]
    NotFound,

    #[error("{0}")]
    Config(#[from] StoreError),

    #[error("Failed to restart service: {0}")]
    ServiceControl(#[from] ServiceError),

    #[error("Server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Config(_) | ApiError::ServiceControl(_) | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound => ApiError::NotFound,
            RegistryError::Store(e) => ApiError::Config(e),
            RegistryError::InvalidName
            | RegistryError::ReservedKey
            | RegistryError::AlreadyExists
            | RegistryError::NotAProxy => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(_: bcrypt::BcryptError) -> Self {
        ApiError::Internal
    }
}
