//! HTTP error responses
//!
//! Every error leaves the service as `{ "error": message }` with a matching
//! status code.

use axum::{
    extract::OriginalUri,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error returned by API handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<cinedb_common::Error> for ApiError {
    fn from(err: cinedb_common::Error) -> Self {
        use cinedb_common::Error;

        match err {
            Error::NotFound(message) => ApiError::NotFound(message),
            Error::InvalidInput(message) => ApiError::BadRequest(message),
            Error::Database(ref db_err)
                if db_err
                    .as_database_error()
                    .is_some_and(|e| e.is_foreign_key_violation()) =>
            {
                ApiError::BadRequest(
                    "critic_id or movie_id does not reference an existing record".to_string(),
                )
            }
            other => {
                error!("Request failed: {}", other);
                ApiError::Internal("Something went wrong!".to_string())
            }
        }
    }
}

impl From<cinedb_common::normalize::NormalizeError> for ApiError {
    fn from(err: cinedb_common::normalize::NormalizeError) -> Self {
        cinedb_common::Error::from(err).into()
    }
}

/// Fallback for paths no route matches
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Path not found: {}", uri.path()))
}

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::MethodNotAllowed(format!("{} not allowed for {}", method, uri.path()))
}
