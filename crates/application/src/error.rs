//! Application error types

use roomly_domain::{DomainError, RequestId};
use thiserror::Error;

use crate::ports::{SessionFlagError, TransportError};

/// Why a refresh attempt did not produce a usable access token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// The refresh request never got a response.
    #[error("refresh request failed: {0}")]
    Transport(#[from] TransportError),

    /// The refresh endpoint answered with a non-2xx status.
    #[error("refresh rejected with status {status}")]
    Rejected {
        /// Status returned by the refresh endpoint
        status: u16,
    },

    /// The response was 2xx but carried no usable `data.accessToken`.
    #[error("refresh response carried no access token")]
    MissingToken,

    /// The response body was not the expected JSON envelope.
    #[error("malformed refresh response: {0}")]
    Malformed(String),
}

/// Errors surfaced to callers of the API client.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// A 401 that was not (or could not be) recovered by a refresh.
    #[error("unauthorized{}", message_suffix(.message))]
    Unauthorized {
        /// The failing request, when one was attached to the error
        request: Option<RequestId>,
        /// Backend message, if the body carried one
        message: Option<String>,
    },

    /// The session could not be renewed; the user has been logged out.
    #[error("session expired: {0}")]
    RefreshFailed(#[source] RefreshError),

    /// A non-2xx response other than a recoverable 401.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Backend `error.message`, or a generic description
        message: String,
        /// Raw response body
        body: Vec<u8>,
    },

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A 2xx response did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    Domain(#[from] DomainError),

    /// The durable logged-out flag could not be read or written.
    #[error(transparent)]
    SessionFlags(#[from] SessionFlagError),
}

impl ApiError {
    /// Builds a status error, pulling the backend message out of the body.
    #[must_use]
    pub fn from_status(status: u16, body: Vec<u8>) -> Self {
        let message = roomly_domain::BackendError::message_from(&body)
            .unwrap_or_else(|| format!("HTTP {status}"));
        Self::Status {
            status,
            message,
            body,
        }
    }

    /// Returns the HTTP status, if the error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the underlying transport failure, including one hit while
    /// refreshing.
    #[must_use]
    pub const fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) | Self::RefreshFailed(RefreshError::Transport(e)) => Some(e),
            _ => None,
        }
    }

    /// Message suitable for showing next to a form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Unauthorized {
                message: Some(message),
                ..
            } => message.clone(),
            Self::RefreshFailed(_) => crate::auth::SESSION_EXPIRED_NOTICE.to_string(),
            other => other.to_string(),
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Result type alias for API client operations.
pub type ApiResult<T> = Result<T, ApiError>;
