//! Common error types for cinedb

use thiserror::Error;

use crate::normalize::{NormalizeError, ShapeError};

/// Common result type for cinedb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across cinedb crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Response shape rejected at construction
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    /// Join rows did not match the shape they were reduced with
    #[error("Normalize error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
