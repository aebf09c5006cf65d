use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use core_auth::AuthError;
use core_sync::SyncError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failures while wiring the service together.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Error returned by the HTTP handlers.
///
/// Rendered as `{ "success": false, "error": "<message>" }`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Sync(SyncError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Sync(SyncError::Auth(
                AuthError::CredentialStorage(_) | AuthError::Other(_),
            )) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Sync(SyncError::Auth(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Sync(SyncError::Remote(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Sync(SyncError::Storage(_) | SyncError::Catalog(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            error!(error = %self, "Request failed");
            "internal server error".to_string()
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
            self.to_string()
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
