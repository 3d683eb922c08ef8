//! Domain error model.

use thiserror::Error;

/// Errors raised by the shared primitives.
///
/// Crates with their own failure modes (auth, products, stores) define their
/// own error types and only surface this one when parsing identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
