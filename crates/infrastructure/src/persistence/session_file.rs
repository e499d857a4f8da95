//! Durable client session state.
//!
//! Stored in the platform-specific config directory by default:
//! - Linux: ~/.config/roomly/session.json
//! - macOS: ~/Library/Application Support/roomly/session.json
//! - Windows: %APPDATA%/roomly/session.json
//!
//! The file holds the `loggedOut` flag and a snapshot of the transport's
//! cookie jar, so the refresh cookie survives between runs of the CLI.
//! On Unix the file is created owner-only (0600).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use roomly_application::ports::{SessionFlagError, SessionFlagStore};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Error type for session file operations.
#[derive(Debug, thiserror::Error)]
pub enum FlagStoreError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

impl From<FlagStoreError> for SessionFlagError {
    fn from(error: FlagStoreError) -> Self {
        match error {
            FlagStoreError::Serialization(e) => Self::Corrupt(e.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Contents of the session file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionFile {
    /// Set by an explicit logout, cleared by the next login.
    pub logged_out: bool,
    /// Opaque cookie jar snapshot from the transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
}

/// File-backed [`SessionFlagStore`].
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store at the default location.
    ///
    /// # Errors
    ///
    /// Returns [`FlagStoreError::NoConfigDir`] if the platform has none.
    pub fn at_default_location() -> Result<Self, FlagStoreError> {
        Self::default_path()
            .map(Self::new)
            .ok_or(FlagStoreError::NoConfigDir)
    }

    /// Returns the default session file path, if available.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roomly").join("session.json"))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the session file.
    ///
    /// A missing file reads as the default (not logged out, no cookies).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<SessionFile, FlagStoreError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(SessionFile::default());
        }
        let content = fs::read(&self.path).await?;
        Ok(from_json_bytes(&content)?)
    }

    /// Applies `change` to the stored contents and writes them back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or written.
    pub async fn update<F>(&self, change: F) -> Result<SessionFile, FlagStoreError>
    where
        F: FnOnce(&mut SessionFile) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;
        change(&mut file);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        write_private(&self.path, &to_json_stable_bytes(&file)?).await?;
        tracing::debug!(path = %self.path.display(), "session file written");
        Ok(file)
    }

    /// Stored cookies, if any.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn cookies(&self) -> Result<Option<String>, FlagStoreError> {
        Ok(self.load().await?.cookies)
    }

    /// Replaces the stored cookies.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn save_cookies(&self, cookies: Option<String>) -> Result<(), FlagStoreError> {
        self.update(|file| file.cookies = cookies).await?;
        Ok(())
    }
}

/// Writes `contents`, keeping the file readable by its owner only.
async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(path).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // `mode` only applies on creation; tighten files left by older runs.
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }

    file.write_all(contents).await?;
    file.flush().await
}

#[async_trait]
impl SessionFlagStore for FileSessionStore {
    async fn is_logged_out(&self) -> Result<bool, SessionFlagError> {
        Ok(self.load().await?.logged_out)
    }

    async fn set_logged_out(&self, logged_out: bool) -> Result<(), SessionFlagError> {
        self.update(|file| file.logged_out = logged_out).await?;
        Ok(())
    }
}
