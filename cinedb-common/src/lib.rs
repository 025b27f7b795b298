//! # cinedb Common Library
//!
//! Shared code for the cinedb service including:
//! - Relational result normalizer (join rows → nested records)
//! - Database initialization, migrations and row conversion
//! - Configuration loading
//! - Error types

pub mod config;
pub mod db;
pub mod error;
pub mod normalize;
pub mod time;

pub use error::{Error, Result};
pub use normalize::{FlatRecord, NestedRecord, Normalizer, ShapeSpec};
