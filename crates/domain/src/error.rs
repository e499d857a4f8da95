//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while building or validating client types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The API path is empty or not rooted at `/`.
    #[error("invalid API path: {0}")]
    InvalidPath(String),

    /// A header name or value cannot be sent.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A request body could not be encoded as JSON.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A booking or search parameter is out of range.
    #[error("invalid booking parameter: {0}")]
    InvalidBookingParameter(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
