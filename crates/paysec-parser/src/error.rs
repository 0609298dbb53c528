//! Error types for paysec-parser

use thiserror::Error;

/// Filter grammar failures. Display text is client facing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unknown filter key: {key}")]
    UnknownKey { key: String },

    #[error("Invalid {field} filter")]
    InvalidFilter { field: String },

    #[error("Invalid filter: {message}")]
    Malformed { message: String },
}

impl ParseError {
    pub(crate) fn invalid(field: &str) -> Self {
        ParseError::InvalidFilter {
            field: field.to_string(),
        }
    }
}
