//! Error types for conversion operations
//!
//! Malformed markup is never an error: the parser degrades to a best-effort
//! tree instead. What remains are structural problems that abort a single
//! conversion call.

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, BabelError>;

/// Rejected while building a typed tree, before anything reaches the serializer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Heading levels only go from 1 to 6
    #[error("heading level {0} is outside 1..=6")]
    HeadingLevel(i64),

    /// Mentions must point at a user
    #[error("mention has an empty user id")]
    EmptyUserId,
}

/// Errors that can occur during format operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BabelError {
    /// The tree failed construction-time validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Disclosure nesting went past the configured limit
    #[error("Structure too deep: disclosure nesting exceeds {limit}")]
    StructureTooDeep { limit: usize },

    /// Wire JSON could not be read or written
    #[error("JSON error: {0}")]
    Json(String),

    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),

    /// Format does not support the requested direction
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl From<serde_json::Error> for BabelError {
    fn from(err: serde_json::Error) -> Self {
        BabelError::Json(err.to_string())
    }
}
