//! Normalizer precondition errors

use thiserror::Error;

/// Structural defect in a shape, reported by [`ShapeSpec::build`](super::ShapeSpec::build)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Empty {0} name in shape")]
    EmptyName(&'static str),

    #[error("Output field '{0}' is written by more than one rule")]
    DuplicateOutput(String),

    #[error("Group '{0}' collides with a scalar output of the same name")]
    GroupConflict(String),

    #[error("Group '{0}' is used both as a nested array and as a nested object")]
    MixedGroupKind(String),

    #[error("Identity declared for unknown group '{0}'")]
    UnknownGroup(String),

    #[error("Identity field '{leaf}' is not a leaf of group '{group}'")]
    UnknownIdentityLeaf { group: String, leaf: String },

    #[error("Identity for group '{0}' names no leaves")]
    EmptyIdentity(String),

    #[error("Identity declared more than once for group '{0}'")]
    DuplicateIdentity(String),

    #[error("Unsupported path descriptor: {0}")]
    UnsupportedDescriptor(String),
}

/// Input rows do not match the shape they were reduced with
///
/// Raised on the first offending row; no partial output is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Row {row} is missing id field '{field}'")]
    MissingIdField { row: usize, field: String },

    #[error("Row {row} is missing source field '{field}'")]
    MissingSourceField { row: usize, field: String },
}
