//! Error types for value parsing in homesens-types.

use thiserror::Error;

/// Errors that can occur when turning raw sensor or API text into numbers.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    /// The input was empty after trimming.
    #[error("empty value")]
    Empty,

    /// The input was not a finite decimal number.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
}

/// Result type alias using homesens-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
