//! Error types for the invex-core library.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to invoice field extraction.
///
/// None of these escape the top-level extraction entry points: parse failures
/// discard a single candidate, pattern failures only happen when an extractor
/// is built from user supplied patterns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// A user supplied regular expression could not be compiled.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ExtractionError {
    pub(crate) fn parse(field: &str, value: impl Into<String>) -> Self {
        Self::Parse {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub(crate) fn invalid_pattern(pattern: &str, err: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
