//! Error types for datamon
//!
//! Decode failures, configuration-import failures and index errors are kept
//! apart so callers can tell "re-request the data" from "fix the config".

use thiserror::Error;

/// Result type alias for datamon operations
pub type Result<T> = std::result::Result<T, DatamonError>;

/// Main error type for metric operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatamonError {
    /// Decoding error
    #[error("Decoding error: {0}")]
    Decode(#[from] DecodeError),

    /// Configuration import error (key-value view only)
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Histogram or profile shape is impossible
    #[error("Invalid range: min {min}, max {max}, bin count {bin_count}")]
    InvalidRange { min: i64, max: i64, bin_count: i64 },

    /// Channel or bit index past the declared bound
    #[error("Index {index} out of range (bound {bound})")]
    IndexOutOfRange { index: usize, bound: usize },

    /// Fixed-size array given the wrong number of values
    #[error("Expected {expected} values, received {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

impl DatamonError {
    /// True when the stream was simply too short
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Decode(DecodeError::TruncatedInput { .. }))
    }
}

/// Errors while reading a word stream
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Fewer words remain than the metric declares
    #[error("Truncated input for {metric}: need {needed} words, have {available}")]
    TruncatedInput {
        metric: &'static str,
        needed: usize,
        available: usize,
    },

    /// Decoded metadata describes an impossible shape
    #[error("Invalid decoded range: min {min}, max {max}, bin count {bin_count}")]
    InvalidRange { min: i64, max: i64, bin_count: i64 },
}

/// Errors while importing a key-value configuration view
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Expected key is absent
    #[error("Missing key [{0}]")]
    MissingKey(String),

    /// Array value has the wrong length
    #[error("Incorrect number of {key} values: expected {expected}, received {actual}")]
    SizeMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    /// Value type does not match the destination field
    #[error("Type mismatch for {key}: expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}
