//! Relational result normalizer
//!
//! Folds the flat rows produced by SQL joins (parent columns repeated once per
//! matched child) into nested records grouped by an identity field.
//!
//! # Architecture
//!
//! - [`ShapeSpec`]: declarative list of rules mapping a source column to a
//!   [`FieldPath`] (scalar copy, nested array element field, nested object field)
//! - [`ShapeSpec::build`]: validates the rules once and compiles a [`Normalizer`]
//! - [`Normalizer::reduce`]: single pass over the rows, grouping by the id field
//!   in first-encounter order and deduplicating nested elements per group
//!
//! # Usage
//!
//! ```
//! use cinedb_common::normalize::{FlatRecord, ShapeSpec};
//! use serde_json::json;
//!
//! let normalizer = ShapeSpec::new("theater_id")
//!     .scalar("theater_id")
//!     .scalar("name")
//!     .nested("movie_id", "movies", "movie_id")
//!     .nested("title", "movies", "title")
//!     .identity("movies", ["movie_id"])
//!     .build()
//!     .unwrap();
//!
//! let rows: Vec<FlatRecord> = serde_json::from_value(json!([
//!     { "theater_id": 1, "name": "A", "movie_id": 10, "title": "X" },
//!     { "theater_id": 1, "name": "A", "movie_id": 11, "title": "Y" },
//! ]))
//! .unwrap();
//!
//! let records = normalizer.reduce(&rows).unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0]["movies"].as_array().map(Vec::len), Some(2));
//! ```

mod error;
mod flatten;
mod reduce;
mod shape;

use serde_json::{Map, Value};

pub use error::{NormalizeError, ShapeError};
pub use reduce::Normalizer;
pub use shape::{FieldPath, FieldRule, ShapeSpec};

/// One row of a join result: column name to scalar value
pub type FlatRecord = Map<String, Value>;

/// One grouped output record with its nested arrays and objects
pub type NestedRecord = Map<String, Value>;
