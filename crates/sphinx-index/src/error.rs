//! Error types for sphinx-index operations

use thiserror::Error;

use crate::validate::ValidationReport;

/// Error produced while reading a `searchindex.js` payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The literal itself is malformed.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// Human-readable description of what went wrong
        message: String,
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
    },

    /// The input does not start with `Search.setIndex(`.
    #[error("input does not start with a `Search.setIndex(` call")]
    MissingEnvelope,

    /// The `Search.setIndex(` call is never closed.
    #[error("`Search.setIndex(` call is missing its closing parenthesis")]
    UnclosedEnvelope,

    /// Extra input after the object literal.
    #[error("unexpected trailing input at line {line}, column {column}")]
    TrailingInput {
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
    },

    /// The literal nests deeper than the reader allows.
    #[error("literal nests deeper than {max} levels")]
    TooDeep {
        /// Maximum allowed nesting depth
        max: usize,
    },

    /// The literal parsed, but its shape does not match a search index.
    #[error("index shape error: {0}")]
    Shape(String),
}

impl ParseError {
    /// Create a syntax error at the given position.
    pub fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Error returned when an index fails its consistency checks.
///
/// Carries the full [`ValidationReport`] so callers can inspect every
/// violation, not just the first.
#[derive(Error, Debug, Clone)]
#[error("search index failed validation: {errors} error(s), {warnings} warning(s)")]
pub struct ValidateError {
    /// Number of error-severity violations
    pub errors: usize,
    /// Number of warning-severity violations
    pub warnings: usize,
    /// The full report that triggered this error
    pub report: ValidationReport,
}

/// Main error type for sphinx-index operations.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Parsing the payload failed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The index is internally inconsistent
    #[error(transparent)]
    Validate(#[from] ValidateError),

    /// Re-serializing an index failed
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Reading the payload from disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sphinx-index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
