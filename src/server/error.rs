//! Transport errors and their HTTP mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use uuid::Uuid;

use crate::error::RuntimeError;
use crate::executor::RegistryError;

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The application's command table could not be built.
    #[error("Failed to start session: {0}")]
    Registry(#[from] RegistryError),

    #[error("Session '{0}' not found")]
    SessionNotFound(Uuid),

    #[error("Session limit of {max} reached")]
    SessionLimit { max: usize },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Runtime(RuntimeError::MalformedMessage {
            reason: rejection.body_text(),
        })
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Runtime(err) => match err {
                RuntimeError::MalformedMessage { .. } => StatusCode::BAD_REQUEST,
                RuntimeError::TransitionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                RuntimeError::ProjectionFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                RuntimeError::Disconnected => StatusCode::GONE,
                RuntimeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            },
            ApiError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SessionLimit { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Runtime(err) => err.error_type(),
            ApiError::Registry(err) => err.error_type(),
            ApiError::SessionNotFound(_) => "session_not_found",
            ApiError::SessionLimit { .. } => "session_limit",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error_type = self.error_type(), "{}", self);
        } else {
            tracing::debug!(error_type = self.error_type(), "{}", self);
        }

        let body = serde_json::json!({
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}
