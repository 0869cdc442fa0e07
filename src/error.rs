//! Failure taxonomy of the metadata repository and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by directory lookups and registry operations.
///
/// `NotFound` and `Conflict` are precondition violations detected by this
/// crate. Storage failures are carried unchanged in `Store`.
#[derive(Error, Debug)]
pub enum MdrError {
    /// A referenced entity, data model or association is absent or soft-deleted.
    #[error("{0}")]
    NotFound(String),
    /// A uniqueness rule on associations would be violated.
    #[error("{0}")]
    Conflict(String),
    /// Persistence layer failure.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl MdrError {
    pub fn not_found(message: impl Into<String>) -> Self {
        MdrError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        MdrError::Conflict(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            MdrError::NotFound(_) => StatusCode::NOT_FOUND,
            MdrError::Conflict(_) => StatusCode::BAD_REQUEST,
            MdrError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// `NotFound` maps to 404 and `Conflict` to 400 with the message in the body.
/// Storage failures are logged and answered with a generic 500.
impl IntoResponse for MdrError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            MdrError::Store(err) => {
                log::error!("Storage failure: {:#}", err);
                ErrorResponse::new("Internal server error")
            }
            err => ErrorResponse::new(&err.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
