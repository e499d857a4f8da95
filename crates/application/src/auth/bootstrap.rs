//! Silent session restore at startup.

use std::sync::Arc;

use roomly_domain::{AnonymousReason, BootstrapOutcome, BootstrapStatus, UserProfile, routes};
use tokio::sync::{OnceCell, watch};

use super::refresh::RefreshCoordinator;
use crate::client::ApiClient;
use crate::ports::SessionFlagStore;

/// Tries once per process to turn the refresh cookie into a signed-in
/// session, and tells waiters when it is done.
pub struct AutoLogin {
    api: ApiClient,
    refresher: Arc<RefreshCoordinator>,
    flags: Arc<dyn SessionFlagStore>,
    outcome: OnceCell<BootstrapOutcome>,
    status: watch::Sender<BootstrapStatus>,
}

impl AutoLogin {
    /// Create a bootstrapper in the `Loading` state.
    #[must_use]
    pub fn new(
        api: ApiClient,
        refresher: Arc<RefreshCoordinator>,
        flags: Arc<dyn SessionFlagStore>,
    ) -> Self {
        let (status, _) = watch::channel(BootstrapStatus::Loading);
        Self {
            api,
            refresher,
            flags,
            outcome: OnceCell::new(),
            status,
        }
    }

    /// Watch the loading indicator.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BootstrapStatus> {
        self.status.subscribe()
    }

    /// Current loading indicator.
    #[must_use]
    pub fn status(&self) -> BootstrapStatus {
        self.status.borrow().clone()
    }

    /// Wait until the bootstrap has finished and return its outcome.
    pub async fn wait_ready(&self) -> BootstrapOutcome {
        if let Some(outcome) = self.outcome.get() {
            return outcome.clone();
        }
        let mut rx = self.status.subscribe();
        match rx.wait_for(BootstrapStatus::is_ready).await {
            Ok(status) => match &*status {
                BootstrapStatus::Ready(outcome) => outcome.clone(),
                BootstrapStatus::Loading => BootstrapOutcome::Skipped,
            },
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => BootstrapOutcome::Skipped,
        }
    }

    /// Run the bootstrap for a client that started on `current_path`.
    ///
    /// Only the first call does any work; later calls return the same
    /// outcome. Failures end in [`BootstrapOutcome::Anonymous`], never in an
    /// error, and the status always moves to `Ready`.
    pub async fn run(&self, current_path: &str) -> BootstrapOutcome {
        self.outcome
            .get_or_init(|| async {
                let outcome = self.attempt(current_path).await;
                tracing::info!(?outcome, "bootstrap finished");
                self.status
                    .send_replace(BootstrapStatus::Ready(outcome.clone()));
                outcome
            })
            .await
            .clone()
    }

    async fn attempt(&self, current_path: &str) -> BootstrapOutcome {
        if routes::is_oauth_callback(current_path) {
            tracing::debug!(path = current_path, "oauth callback handles its own login");
            return BootstrapOutcome::Skipped;
        }

        match self.flags.is_logged_out().await {
            Ok(true) => {
                tracing::debug!("user logged out earlier; not restoring session");
                return BootstrapOutcome::Anonymous(AnonymousReason::LoggedOutFlag);
            }
            Ok(false) => {}
            Err(error) => tracing::warn!(%error, "could not read logged-out flag"),
        }

        let token = match self.refresher.refresh_now().await {
            Ok(token) => token,
            Err(error) => {
                return BootstrapOutcome::Anonymous(AnonymousReason::RefreshRejected(
                    error.to_string(),
                ));
            }
        };

        let session = self.api.session();
        let profile_path = self.api.endpoints().profile.clone();
        match self.api.get_data::<UserProfile>(profile_path).await {
            Ok(profile) => {
                session.restore(token, profile.clone()).await;
                BootstrapOutcome::LoggedIn(profile)
            }
            Err(error) => {
                tracing::warn!(%error, "session restored but profile unavailable");
                session.reset().await;
                BootstrapOutcome::Anonymous(AnonymousReason::ProfileUnavailable(
                    error.to_string(),
                ))
            }
        }
    }
}

impl std::fmt::Debug for AutoLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoLogin")
            .field("outcome", &self.outcome.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::{RefreshClient, SessionContext};
    use crate::ports::TransportError;
    use crate::testing::{FixedClock, MemoryFlags, ScriptedTransport, profile_body, token_body};
    use pretty_assertions::assert_eq;
    use roomly_domain::{Endpoints, SessionState};
    use serde_json::json;

    struct Harness {
        transport: Arc<ScriptedTransport>,
        session: Arc<SessionContext>,
        auto_login: AutoLogin,
    }

    fn harness(flags: MemoryFlags) -> Harness {
        let transport = Arc::new(ScriptedTransport::new());
        let session = Arc::new(SessionContext::new(Arc::new(FixedClock)));
        let refresher = Arc::new(RefreshCoordinator::new(
            RefreshClient::new(transport.clone(), "/auth/refresh"),
            session.tokens().clone(),
        ));
        let api = ApiClient::new(
            transport.clone(),
            session.clone(),
            refresher.clone(),
            Endpoints::default(),
        );
        let auto_login = AutoLogin::new(api, refresher, Arc::new(flags));
        Harness {
            transport,
            session,
            auto_login,
        }
    }

    #[tokio::test]
    async fn test_restores_session_from_refresh_cookie() {
        let h = harness(MemoryFlags::default());
        h.transport
            .reply_json("/auth/refresh", 200, &token_body("new1"))
            .reply_json("/users/profile", 200, &profile_body("Ada"));

        let outcome = h.auto_login.run("/").await;

        let BootstrapOutcome::LoggedIn(profile) = &outcome else {
            panic!("unexpected outcome {outcome:?}");
        };
        assert_eq!(profile.name, "Ada");
        assert_eq!(h.session.tokens().get().await.unwrap().as_str(), "new1");
        assert!(h.session.state().await.is_logged_in());
        assert_eq!(h.auto_login.status(), BootstrapStatus::Ready(outcome.clone()));

        let profile_calls = h.transport.sent_to("/users/profile");
        assert_eq!(profile_calls[0].authorization(), Some("Bearer new1"));
    }

    #[tokio::test]
    async fn test_refresh_failure_still_resolves_loading() {
        let h = harness(MemoryFlags::default());
        let net = TransportError::ConnectionFailed("offline".to_string());
        h.transport.reply("/auth/refresh", Err(net));
        let rx = h.auto_login.subscribe();
        assert_eq!(*rx.borrow(), BootstrapStatus::Loading);

        let outcome = h.auto_login.run("/").await;

        assert!(matches!(
            outcome,
            BootstrapOutcome::Anonymous(AnonymousReason::RefreshRejected(_))
        ));
        assert!(rx.borrow().is_ready());
        assert_eq!(h.session.state().await, SessionState::Anonymous);
        assert!(h.transport.sent_to("/users/profile").is_empty());
    }

    #[tokio::test]
    async fn test_profile_failure_leaves_session_anonymous() {
        let h = harness(MemoryFlags::default());
        h.transport
            .reply_json("/auth/refresh", 200, &token_body("new1"))
            .reply_json("/users/profile", 500, &json!({}));

        let outcome = h.auto_login.run("/").await;

        assert!(matches!(
            outcome,
            BootstrapOutcome::Anonymous(AnonymousReason::ProfileUnavailable(_))
        ));
        assert!(h.session.tokens().get().await.is_none());
        assert!(h.auto_login.status().is_ready());
    }

    #[tokio::test]
    async fn test_runs_only_once() {
        let h = harness(MemoryFlags::default());
        h.transport
            .reply_json("/auth/refresh", 200, &token_body("new1"))
            .reply_json("/users/profile", 200, &profile_body("Ada"));

        let first = h.auto_login.run("/").await;
        let second = h.auto_login.run("/").await;

        assert_eq!(first, second);
        assert_eq!(h.transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_logged_out_flag_skips_refresh() {
        let h = harness(MemoryFlags::logged_out());

        let outcome = h.auto_login.run("/").await;

        assert_eq!(
            outcome,
            BootstrapOutcome::Anonymous(AnonymousReason::LoggedOutFlag)
        );
        assert!(h.transport.sent().is_empty());
        assert!(h.auto_login.status().is_ready());
    }

    #[tokio::test]
    async fn test_unreadable_flag_still_tries_refresh() {
        let h = harness(MemoryFlags::broken());
        h.transport.reply_json("/auth/refresh", 401, &json!({}));

        h.auto_login.run("/").await;

        assert_eq!(h.transport.sent_to("/auth/refresh").len(), 1);
    }

    #[tokio::test]
    async fn test_oauth_callback_is_skipped() {
        let h = harness(MemoryFlags::default());

        let outcome = h.auto_login.run("/oauth/success").await;

        assert_eq!(outcome, BootstrapOutcome::Skipped);
        assert!(h.transport.sent().is_empty());
        assert_eq!(
            h.auto_login.status(),
            BootstrapStatus::Ready(BootstrapOutcome::Skipped)
        );
    }

    #[tokio::test]
    async fn test_wait_ready_resolves_after_run() {
        let h = Arc::new(harness(MemoryFlags::logged_out()));
        let waiter = {
            let h = h.clone();
            tokio::spawn(async move { h.auto_login.wait_ready().await })
        };

        h.auto_login.run("/").await;

        assert_eq!(
            waiter.await.unwrap(),
            BootstrapOutcome::Anonymous(AnonymousReason::LoggedOutFlag)
        );
    }
}
