//! Cookie jar that can be saved between runs.
//!
//! reqwest's own `Jar` can only hand back a flattened `Cookie` header for
//! one URL, which loses cookies scoped to other paths (the refresh cookie
//! is usually `Path=/auth/refresh`) along with their expiry. This jar keeps
//! the full `cookie_store` state so it can be written out and read back
//! with every attribute intact.

use std::sync::{PoisonError, RwLock};

use cookie_store::{CookieStore, RawCookie};
use reqwest::Url;
use reqwest::header::HeaderValue;

/// Error while saving or restoring the jar.
#[derive(Debug, thiserror::Error)]
pub enum CookieJarError {
    /// The jar could not be written out.
    #[error("failed to save cookies: {0}")]
    Save(String),

    /// A saved jar could not be read back.
    #[error("failed to restore cookies: {0}")]
    Restore(String),
}

/// Shared cookie store for the credentialed reqwest client.
#[derive(Debug, Default)]
pub struct PersistentCookieJar {
    store: RwLock<CookieStore>,
}

impl PersistentCookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes every cookie, session cookies included.
    ///
    /// Returns `None` when the jar is empty.
    ///
    /// # Errors
    ///
    /// Returns [`CookieJarError::Save`] if serialization fails.
    pub fn snapshot(&self) -> Result<Option<String>, CookieJarError> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        if store.iter_unexpired().next().is_none() {
            return Ok(None);
        }
        let mut buffer = Vec::new();
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut buffer)
            .map_err(|e| CookieJarError::Save(e.to_string()))?;
        String::from_utf8(buffer)
            .map(Some)
            .map_err(|e| CookieJarError::Save(e.to_string()))
    }

    /// Replaces the jar contents with a snapshot. Expired cookies are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CookieJarError::Restore`] if the snapshot is not readable.
    pub fn restore(&self, snapshot: &str) -> Result<(), CookieJarError> {
        let restored = cookie_store::serde::json::load(snapshot.as_bytes())
            .map_err(|e| CookieJarError::Restore(e.to_string()))?;
        let count = restored.iter_unexpired().count();
        *self.store.write().unwrap_or_else(PoisonError::into_inner) = restored;
        tracing::debug!(count, "cookies restored");
        Ok(())
    }
}

impl reqwest::cookie::CookieStore for PersistentCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies = cookie_headers.filter_map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|raw| RawCookie::parse(raw).ok())
                .map(RawCookie::into_owned)
        });
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .store_response_cookies(cookies, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_request_values(url)
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}
