//! Unified error types for the domain layer
//!
//! Domain types never touch I/O, so the only failures are parse and
//! validation problems surfaced while building records from untrusted input.

use thiserror::Error;

use crate::dice::DiceParseError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field the record cannot exist without was absent or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Dice formula could not be read
    #[error(transparent)]
    Dice(#[from] DiceParseError),
}

impl DomainError {
    /// Creates a missing-field error for an identifying field.
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField(field)
    }

    /// Creates a parse error for value objects that fail to parse.
    ///
    /// # Example
    /// ```ignore
    /// "wizard".parse::<DomainKind>().map_err(|_| DomainError::parse("unknown kind"))?;
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Check if this is a MissingField error.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField(_))
    }
}
