//! HTTP API handlers for cinedb-api

pub mod buildinfo;
pub mod error;
pub mod health;
pub mod movies;
pub mod reviews;
pub mod theaters;

use serde::Serialize;

pub use buildinfo::get_build_info;
pub use error::{method_not_allowed, not_found, ApiError};
pub use health::health_routes;

/// Envelope for every successful JSON body: `{ "data": ... }`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
