//! In-memory access token storage.
//!
//! Holds at most one access token. Readers must call [`TokenStore::get`]
//! right before attaching the token to a request; a copy kept across an
//! await point may already have been replaced by a refresh.

use std::sync::Arc;

use roomly_domain::AccessToken;
use tokio::sync::RwLock;

/// Thread-safe holder of the current access token.
///
/// Cloning yields a handle to the same slot.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<AccessToken>>>,
}

impl TokenStore {
    /// Create an empty (unauthenticated) token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current token. The value is not validated.
    pub async fn set(&self, token: AccessToken) {
        tracing::debug!(len = token.as_str().len(), "storing access token");
        let mut slot = self.token.write().await;
        *slot = Some(token);
    }

    /// Get the current token, or `None` when unauthenticated.
    pub async fn get(&self) -> Option<AccessToken> {
        let slot = self.token.read().await;
        slot.clone()
    }

    /// Remove the token, returning to the unauthenticated state.
    pub async fn clear(&self) {
        let mut slot = self.token.write().await;
        if slot.take().is_some() {
            tracing::debug!("access token cleared");
        }
    }

    /// Returns true if a token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }
}
