//! Errors surfaced by the CLI.

use roomly_application::ApiError;
use roomly_application::ports::TransportError;
use roomly_domain::DomainError;
use roomly_infrastructure::{ConfigError, CookieJarError, FlagStoreError};

/// Anything that can stop a command.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP transport could not be created.
    #[error("failed to start HTTP client: {0}")]
    Transport(#[from] TransportError),

    /// The session file could not be used.
    #[error("session file: {0}")]
    SessionFile(#[from] FlagStoreError),

    /// Saved cookies could not be loaded or stored.
    #[error(transparent)]
    Cookies(#[from] CookieJarError),

    /// A backend call failed.
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// Output could not be written.
    #[error("output: {0}")]
    Output(#[from] std::io::Error),

    /// The signed-in user may not use this command.
    #[error("{0}")]
    Forbidden(String),

    /// Command arguments were rejected.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}
