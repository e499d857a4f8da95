//! Injectable session context.
//!
//! Bundles the token store, the signed-in user and the event hub so that
//! every component shares one explicit object instead of ambient globals.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use roomly_domain::{AccessToken, SessionState, UserProfile};
use tokio::sync::RwLock;

use super::events::{Redirect, SESSION_EXPIRED_NOTICE, SessionEvent, SessionEvents};
use super::token_store::TokenStore;
use crate::ports::Clock;

#[derive(Debug, Default)]
struct Established {
    state: SessionState,
    since: Option<DateTime<Utc>>,
}

/// Shared session state for one running client.
pub struct SessionContext {
    tokens: TokenStore,
    current: RwLock<Established>,
    events: SessionEvents,
    clock: Arc<dyn Clock>,
}

impl SessionContext {
    /// Create an anonymous session.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: TokenStore::new(),
            current: RwLock::new(Established::default()),
            events: SessionEvents::new(),
            clock,
        }
    }

    /// The access token slot.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The event hub.
    #[must_use]
    pub const fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Snapshot of the current session state.
    pub async fn state(&self) -> SessionState {
        self.current.read().await.state.clone()
    }

    /// When the current session was established, if signed in.
    pub async fn established_at(&self) -> Option<DateTime<Utc>> {
        self.current.read().await.since
    }

    /// Record a signed-in user without announcing it.
    ///
    /// Used by the startup bootstrap, which reports through its own channel.
    pub async fn restore(&self, token: AccessToken, profile: UserProfile) {
        self.tokens.set(token).await;
        self.set_profile(profile).await;
    }

    /// Record a signed-in user and publish [`SessionEvent::LoggedIn`].
    pub async fn sign_in(&self, token: AccessToken, profile: UserProfile) {
        self.restore(token, profile.clone()).await;
        tracing::info!(email = %profile.email, "signed in");
        self.events.publish(SessionEvent::LoggedIn(profile));
    }

    /// Replace the stored profile, keeping the session timestamp.
    pub async fn update_profile(&self, profile: UserProfile) {
        let mut current = self.current.write().await;
        if current.state.is_logged_in() {
            current.state = SessionState::LoggedIn(profile);
        }
    }

    /// Clear everything after an explicit logout.
    pub async fn sign_out(&self) {
        self.reset().await;
        tracing::info!("signed out");
        self.events.publish(SessionEvent::LoggedOut);
    }

    /// Clear everything after an unrecoverable refresh failure and ask the
    /// shell to send the user to the login view.
    pub async fn invalidate(&self) {
        self.reset().await;
        tracing::warn!("session invalidated; redirecting to login");
        self.events.publish(SessionEvent::Expired {
            notice: SESSION_EXPIRED_NOTICE.to_string(),
            redirect: Redirect::replace_with_login(),
        });
    }

    /// Clear token and user without publishing anything.
    pub async fn reset(&self) {
        self.tokens.clear().await;
        let mut current = self.current.write().await;
        *current = Established::default();
    }

    async fn set_profile(&self, profile: UserProfile) {
        let now = self.clock.now();
        let mut current = self.current.write().await;
        current.state = SessionState::LoggedIn(profile);
        current.since = Some(now);
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
