//! Client configuration.
//!
//! Merges an optional TOML file with `ROOMLY_*` environment variables, the
//! environment taking precedence:
//!
//! ```toml
//! base_url = "https://api.roomly.example/api/v1"
//! request_timeout_ms = 15000
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

const ENV_PREFIX: &str = "ROOMLY";

/// Errors while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the expected shape.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// `base_url` is not an absolute http(s) URL.
    #[error("invalid base_url {url:?}: {message}")]
    InvalidBaseUrl {
        /// Configured value
        url: String,
        /// Why it was rejected
        message: String,
    },
}

/// Settings for one client instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomlyConfig {
    /// Backend origin shared by the API and refresh clients.
    pub base_url: String,
    /// Per-request timeout; none means the transport default.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Where the session file lives; defaults to the config directory.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

fn default_user_agent() -> String {
    format!("Roomly/{}", env!("CARGO_PKG_VERSION"))
}

impl RoomlyConfig {
    /// Loads configuration from `file` (if given) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed, `base_url` is missing, or
    /// `base_url` is not a valid URL.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_sources(file, None)
    }

    /// Like [`load`](Self::load), reading variables from `env` instead of the
    /// process environment when given.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn from_sources(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.base_url()?;
        Ok(config)
    }

    /// Parsed backend origin.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] for relative or non-http URLs.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            message,
        };
        let url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Configured session file, falling back to the platform default.
    #[must_use]
    pub fn session_file(&self) -> Option<PathBuf> {
        self.session_file
            .clone()
            .or_else(crate::persistence::FileSessionStore::default_path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_base_url_from_environment() {
        let config = RoomlyConfig::from_sources(
            None,
            env(&[
                ("ROOMLY_BASE_URL", "http://localhost:8080/api/v1"),
                ("ROOMLY_REQUEST_TIMEOUT_MS", "2500"),
            ]),
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.request_timeout(), Some(Duration::from_millis(2500)));
        assert!(config.user_agent.starts_with("Roomly/"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("roomly.toml");
        std::fs::write(
            &file,
            "base_url = \"https://file.example\"\nsession_file = \"/tmp/s.json\"\n",
        )
        .unwrap();

        let from_file = RoomlyConfig::from_sources(Some(&file), env(&[])).unwrap();
        assert_eq!(from_file.base_url, "https://file.example");
        assert_eq!(from_file.session_file(), Some(PathBuf::from("/tmp/s.json")));

        let overridden = RoomlyConfig::from_sources(
            Some(&file),
            env(&[("ROOMLY_BASE_URL", "https://env.example")]),
        )
        .unwrap();
        assert_eq!(overridden.base_url, "https://env.example");
    }

    #[test]
    fn test_missing_base_url_is_an_error() {
        let err = RoomlyConfig::from_sources(None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_non_http_base_url_is_rejected() {
        let err =
            RoomlyConfig::from_sources(None, env(&[("ROOMLY_BASE_URL", "ftp://files.example")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err = RoomlyConfig::from_sources(None, env(&[("ROOMLY_BASE_URL", "/relative")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }
}
