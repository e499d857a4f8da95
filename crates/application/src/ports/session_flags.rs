//! Durable session flag port
//!
//! Records that the user explicitly logged out so the next startup does not
//! silently sign them back in.

use async_trait::async_trait;

/// Errors raised by a flag store backend.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SessionFlagError {
    /// Reading or writing the backing storage failed.
    #[error("session flag storage error: {0}")]
    Storage(String),

    /// Stored data could not be decoded.
    #[error("session flag data is corrupt: {0}")]
    Corrupt(String),
}

/// Storage for the `loggedOut` flag.
#[async_trait]
pub trait SessionFlagStore: Send + Sync {
    /// Returns true if the last session ended with an explicit logout.
    ///
    /// A store with no recorded value reports `false`.
    async fn is_logged_out(&self) -> Result<bool, SessionFlagError>;

    /// Records or clears the explicit-logout flag.
    async fn set_logged_out(&self, logged_out: bool) -> Result<(), SessionFlagError>;
}
