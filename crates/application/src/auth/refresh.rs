//! Refresh client and single-flight refresh coordination.
//!
//! The refresh credential is an HTTP-only cookie owned by the transport's
//! cookie jar. This module never sees it; it only asks the transport to send
//! a credentialed `POST` to the refresh endpoint and reads the new access
//! token out of the response.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use roomly_domain::{AccessToken, ApiRequest, Envelope, TokenPayload};
use tokio::sync::Mutex;

use super::token_store::TokenStore;
use crate::error::RefreshError;
use crate::ports::{CredentialsMode, Transport};

/// Exchanges the refresh cookie for a new access token.
#[derive(Clone)]
pub struct RefreshClient {
    transport: Arc<dyn Transport>,
    path: String,
}

impl RefreshClient {
    /// Create a client that posts to `path` (normally `/auth/refresh`).
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }

    /// The refresh endpoint path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Issue one refresh request.
    ///
    /// The request carries cookies but never an `Authorization` header.
    ///
    /// # Errors
    ///
    /// Transport failures are returned untouched; a non-2xx status, a body
    /// that is not the expected envelope, or a missing token are errors too.
    pub async fn refresh(&self) -> Result<AccessToken, RefreshError> {
        let request = ApiRequest::post(self.path.clone())
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;

        let response = self
            .transport
            .send(&request, CredentialsMode::Include)
            .await?;

        if !response.is_success() {
            return Err(RefreshError::Rejected {
                status: response.status,
            });
        }

        let envelope: Envelope<TokenPayload> = response
            .decode()
            .map_err(|e| RefreshError::Malformed(e.to_string()))?;

        envelope
            .data
            .access_token()
            .ok_or(RefreshError::MissingToken)
    }
}

impl std::fmt::Debug for RefreshClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshClient")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Result of asking the coordinator for a fresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coalesced {
    /// The token, or why none could be obtained
    pub result: Result<AccessToken, RefreshError>,
    /// True if this caller ran the refresh; false if it reused one that
    /// finished while it was waiting.
    pub performed: bool,
}

/// Serializes refreshes so concurrent 401s share one refresh call.
///
/// Every send records the current [`epoch`](Self::epoch). A caller whose
/// request failed after a refresh already completed reuses that refresh's
/// outcome instead of starting another one.
#[derive(Debug)]
pub struct RefreshCoordinator {
    client: RefreshClient,
    tokens: TokenStore,
    epoch: AtomicU64,
    last: Mutex<Option<Result<AccessToken, RefreshError>>>,
}

impl RefreshCoordinator {
    /// Create a coordinator that stores refreshed tokens into `tokens`.
    #[must_use]
    pub fn new(client: RefreshClient, tokens: TokenStore) -> Self {
        Self {
            client,
            tokens,
            epoch: AtomicU64::new(0),
            last: Mutex::new(None),
        }
    }

    /// The refresh endpoint path.
    #[must_use]
    pub fn refresh_path(&self) -> &str {
        self.client.path()
    }

    /// Number of completed refreshes.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Refresh on behalf of a request sent at `observed_epoch`.
    ///
    /// If a refresh completed after that point, its outcome is returned
    /// without a new network call.
    pub async fn refresh_after(&self, observed_epoch: u64) -> Coalesced {
        let mut last = self.last.lock().await;
        if self.epoch() != observed_epoch
            && let Some(outcome) = last.as_ref()
        {
            tracing::debug!("joining refresh completed by a concurrent request");
            return Coalesced {
                result: outcome.clone(),
                performed: false,
            };
        }
        let result = self.run(&mut last).await;
        Coalesced {
            result,
            performed: true,
        }
    }

    /// Refresh unconditionally, still serialized with other refreshes.
    ///
    /// # Errors
    ///
    /// Returns the refresh failure; the token store is cleared in that case.
    pub async fn refresh_now(&self) -> Result<AccessToken, RefreshError> {
        let mut last = self.last.lock().await;
        self.run(&mut last).await
    }

    async fn run(
        &self,
        last: &mut Option<Result<AccessToken, RefreshError>>,
    ) -> Result<AccessToken, RefreshError> {
        tracing::debug!(path = %self.client.path(), "refreshing access token");
        let result = self.client.refresh().await;
        match &result {
            Ok(token) => {
                self.tokens.set(token.clone()).await;
                tracing::info!("access token refreshed");
            }
            Err(error) => {
                self.tokens.clear().await;
                tracing::warn!(%error, "access token refresh failed");
            }
        }
        *last = Some(result.clone());
        self.epoch.fetch_add(1, Ordering::AcqRel);
        result
    }
}
