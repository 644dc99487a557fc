use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} has leading or trailing whitespace")]
    Padded { field: &'static str },

    #[error("unexpected payload marker: {0:?}")]
    UnknownMarker(String),
}
