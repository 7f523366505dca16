//! Error types for the UserCSS core
//!
//! Document problems (missing fields, duplicate directives, ...) are never
//! surfaced as `Err`; they end up as strings in `ParseResult`. This enum
//! covers the internal failures the pipeline has to convert.

use thiserror::Error;

use crate::model::Dialect;

/// Main error type for internal operations
#[derive(Error, Debug)]
pub enum StyleError {
    /// JSON parsing/serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// A user supplied regular expression did not compile
    #[error("Invalid pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The external preprocessor engine rejected the stylesheet
    #[error("{dialect} preprocessor failed: {message}")]
    Preprocessor { dialect: Dialect, message: String },

    /// Anything else that should not happen
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result type alias for internal operations
pub type StyleResult<T> = Result<T, StyleError>;

impl From<serde_json::Error> for StyleError {
    fn from(err: serde_json::Error) -> Self {
        StyleError::Json {
            source: err,
            message: "JSON operation failed".to_string(),
        }
    }
}

/// Helper trait for converting JSON errors with context
pub trait JsonContext<T> {
    fn with_json_context(self, message: &str) -> StyleResult<T>;
}

impl<T> JsonContext<T> for Result<T, serde_json::Error> {
    fn with_json_context(self, message: &str) -> StyleResult<T> {
        self.map_err(|e| StyleError::Json {
            message: message.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_context_keeps_message() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err = result.with_json_context("Failed to read options").unwrap_err();
        assert_eq!(err.to_string(), "JSON error: Failed to read options");
    }

    #[test]
    fn test_preprocessor_error_display() {
        let err = StyleError::Preprocessor {
            dialect: Dialect::Less,
            message: "unexpected token".to_string(),
        };
        assert_eq!(err.to_string(), "less preprocessor failed: unexpected token");
    }
}
