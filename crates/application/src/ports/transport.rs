//! Transport port
//!
//! The session layer never talks to an HTTP library directly. Both the
//! authenticated client and the refresh client send through this port.

use async_trait::async_trait;
use thiserror::Error;
use roomly_domain::{ApiRequest, ApiResponse};

/// Whether ambient credentials (the refresh cookie) travel with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsMode {
    /// Send without cookies.
    Omit,
    /// Attach cookies from the shared jar and store any the server sets.
    #[default]
    Include,
}

/// Failures where no HTTP response was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Request timed out.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that was exceeded
        timeout_ms: u64,
    },

    /// DNS resolution failed.
    #[error("Could not resolve host '{host}': {message}")]
    DnsError {
        /// Host that could not be resolved
        host: String,
        /// Underlying message
        message: String,
    },

    /// Server refused the connection.
    #[error("Connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// Connection could not be established for another reason.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The base URL and path do not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for sending requests to the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request exactly as given and returns whatever response
    /// arrived, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` only when no response was received.
    async fn send(
        &self,
        request: &ApiRequest,
        credentials: CredentialsMode,
    ) -> Result<ApiResponse, TransportError>;
}
