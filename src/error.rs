//! Error taxonomy: service-level failures and their HTTP mapping.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{
    dao::storage::StorageError,
    platform::{SyncError, steam::api::RemoteError},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested entity was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A natural key is already taken.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The platform name is not in the registered processor set.
    #[error("unrecognized platform `{0}`")]
    UnrecognizedPlatform(String),
    /// A remote platform API call failed where no silent abort applies.
    #[error("platform api unavailable")]
    Remote(#[source] RemoteError),
    /// Internal consistency assumption broken; corrupted state, not a
    /// retryable condition.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate { entity, key } => {
                ServiceError::Conflict(format!("{entity} with key `{key}` already exists"))
            }
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<SyncError> for ServiceError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Remote(source) => ServiceError::Remote(source),
            SyncError::Storage(source) => source.into(),
            SyncError::Invariant(message) => ServiceError::Invariant(message),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::UnrecognizedPlatform(platform) => {
                AppError::BadRequest(format!("unrecognized platform `{platform}`"))
            }
            ServiceError::Remote(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Invariant(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
