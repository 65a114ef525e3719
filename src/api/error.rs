use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::error::{StoreError, UpdateError};

/// Handler-level error. Responses carry a generic message and code; the
/// original error detail only ever goes to the logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing user identity")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("upstream update failed")]
    UpdateFailed,

    #[error("internal error")]
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        error!(error = %e, "Store operation failed");
        ApiError::Internal
    }
}

impl From<UpdateError> for ApiError {
    fn from(e: UpdateError) -> Self {
        error!(error = %e, "Manual update failed");
        match e {
            UpdateError::Feed(_) => ApiError::UpdateFailed,
            UpdateError::Store(_) => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                self.to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::UpdateFailed => (
                StatusCode::BAD_GATEWAY,
                "UPDATE_FAILED",
                self.to_string(),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}
