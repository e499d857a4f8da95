//! Interactive sign-in, sign-out and profile operations.

use std::sync::Arc;

use roomly_domain::{
    AccessToken, Envelope, GoogleLogin, HttpMethod, LoginCredentials, ProfileUpdate,
    TokenPayload, UserProfile,
};

use super::refresh::RefreshCoordinator;
use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::ports::SessionFlagStore;

/// User-facing auth operations.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    refresher: Arc<RefreshCoordinator>,
    flags: Arc<dyn SessionFlagStore>,
}

impl AuthService {
    /// Create the service.
    #[must_use]
    pub fn new(
        api: ApiClient,
        refresher: Arc<RefreshCoordinator>,
        flags: Arc<dyn SessionFlagStore>,
    ) -> Self {
        Self {
            api,
            refresher,
            flags,
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Wrong credentials surface as the backend's 401 without a refresh.
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<UserProfile> {
        tracing::debug!(email = %credentials.email, "logging in");
        let path = self.api.endpoints().login.clone();
        let payload: TokenPayload = self
            .api
            .send_data(HttpMethod::Post, path, credentials)
            .await?;
        let token = payload
            .access_token()
            .ok_or_else(|| ApiError::Decode("login response carried no access token".into()))?;
        self.establish(token).await
    }

    /// Sign in with a Google identity token.
    ///
    /// # Errors
    ///
    /// See [`login`](Self::login).
    pub async fn login_with_google(&self, id_token: impl Into<String>) -> ApiResult<UserProfile> {
        let body = GoogleLogin {
            id_token: id_token.into(),
        };
        let path = self.api.endpoints().google_login.clone();
        let payload: TokenPayload = self.api.send_data(HttpMethod::Post, path, &body).await?;
        let token = payload
            .any_token()
            .ok_or_else(|| ApiError::Decode("google login carried no token".into()))?;
        self.establish(token).await
    }

    /// Finish a server-side OAuth flow whose callback set the refresh cookie.
    ///
    /// # Errors
    ///
    /// Returns the refresh or profile failure; the session stays anonymous
    /// and no expiry is announced.
    pub async fn complete_oauth(&self) -> ApiResult<UserProfile> {
        let token = self
            .refresher
            .refresh_now()
            .await
            .map_err(ApiError::RefreshFailed)?;
        self.establish(token).await
    }

    /// Sign out.
    ///
    /// The server call is best effort; local state is always cleared and the
    /// logged-out flag set so the next start does not restore the session.
    ///
    /// # Errors
    ///
    /// Only fails if the logged-out flag cannot be written.
    pub async fn logout(&self) -> ApiResult<()> {
        let path = self.api.endpoints().logout.clone();
        if let Err(error) = self.api.send_empty(HttpMethod::Post, path).await {
            tracing::warn!(%error, "server logout failed; clearing local session anyway");
        }
        self.api.session().sign_out().await;
        self.flags.set_logged_out(true).await?;
        Ok(())
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the profile endpoint.
    pub async fn current_user(&self) -> ApiResult<UserProfile> {
        let path = self.api.endpoints().profile.clone();
        self.api.get_data(path).await
    }

    /// Patch the profile and keep the session copy in sync.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the profile endpoint.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        let path = self.api.endpoints().profile.clone();
        let response = self
            .api
            .send(roomly_domain::ApiRequest::patch(path)?.with_json(update)?)
            .await?;
        let profile = match response.decode::<Envelope<UserProfile>>() {
            Ok(envelope) => envelope.data,
            Err(_) => self.current_user().await?,
        };
        self.api.session().update_profile(profile.clone()).await;
        Ok(profile)
    }

    async fn establish(&self, token: AccessToken) -> ApiResult<UserProfile> {
        let session = self.api.session();
        session.tokens().set(token.clone()).await;
        let profile = match self.current_user().await {
            Ok(profile) => profile,
            Err(error) => {
                session.reset().await;
                return Err(error);
            }
        };
        if let Err(error) = self.flags.set_logged_out(false).await {
            tracing::warn!(%error, "could not clear logged-out flag");
        }
        session.sign_in(token, profile.clone()).await;
        Ok(profile)
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::{RefreshClient, SessionContext, SessionEvent};
    use crate::ports::TransportError;
    use crate::testing::{FixedClock, MemoryFlags, ScriptedTransport, profile_body, token_body};
    use pretty_assertions::assert_eq;
    use roomly_domain::{Endpoints, SessionState};
    use serde_json::json;

    struct Harness {
        transport: Arc<ScriptedTransport>,
        session: Arc<SessionContext>,
        flags: Arc<MemoryFlags>,
        auth: AuthService,
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
        let flags = Arc::new(flags);
        let auth = AuthService::new(api, refresher, flags.clone());
        Harness {
            transport,
            session,
            flags,
            auth,
        }
    }

    #[tokio::test]
    async fn test_login_stores_token_and_clears_flag() {
        let h = harness(MemoryFlags::logged_out());
        let mut events = h.session.events().subscribe();
        h.transport
            .reply_json("/auth/login", 200, &token_body("abc123"))
            .reply_json("/users/profile", 200, &profile_body("Ada"));

        let profile = h
            .auth
            .login(&LoginCredentials::new("ada@example.com", "secret"))
            .await
            .unwrap();

        assert_eq!(profile.name, "Ada");
        assert_eq!(h.session.tokens().get().await.unwrap().as_str(), "abc123");
        assert!(!h.flags.get());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedIn(profile));

        let login = &h.transport.sent_to("/auth/login")[0];
        assert_eq!(
            login.request.body,
            Some(json!({"email": "ada@example.com", "password": "secret"}))
        );
        let profile_call = &h.transport.sent_to("/users/profile")[0];
        assert_eq!(profile_call.authorization(), Some("Bearer abc123"));
    }

    #[tokio::test]
    async fn test_wrong_password_is_not_refreshed() {
        let h = harness(MemoryFlags::default());
        h.transport.reply_json(
            "/auth/login",
            401,
            &json!({"error": {"message": "Invalid credentials"}}),
        );

        let err = h
            .auth
            .login(&LoginCredentials::new("ada@example.com", "nope"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(h.transport.sent_to("/auth/refresh").is_empty());
        assert_eq!(h.session.state().await, SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_google_login_accepts_token_field() {
        let h = harness(MemoryFlags::default());
        h.transport
            .reply_json("/auth/google", 200, &json!({"data": {"token": "g-tok"}}))
            .reply_json("/users/profile", 200, &profile_body("Grace"));

        h.auth.login_with_google("id-token-1").await.unwrap();

        let sent = &h.transport.sent_to("/auth/google")[0];
        assert_eq!(sent.request.body, Some(json!({"idToken": "id-token-1"})));
        assert_eq!(h.session.tokens().get().await.unwrap().as_str(), "g-tok");
    }

    #[tokio::test]
    async fn test_complete_oauth_failure_does_not_expire_session() {
        let h = harness(MemoryFlags::default());
        let mut events = h.session.events().subscribe();
        h.transport.reply_json("/auth/refresh", 401, &json!({}));

        let err = h.auth.complete_oauth().await.unwrap_err();

        assert!(matches!(err, ApiError::RefreshFailed(_)));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_logout_clears_token_and_sets_flag() {
        let h = harness(MemoryFlags::default());
        h.session
            .restore(AccessToken::new("abc123"), UserProfile::default())
            .await;
        let mut events = h.session.events().subscribe();
        h.transport.reply_json("/auth/logout", 200, &json!({}));

        h.auth.logout().await.unwrap();

        assert!(h.session.tokens().get().await.is_none());
        assert_eq!(h.session.state().await, SessionState::Anonymous);
        assert!(h.flags.get());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
        let logout = &h.transport.sent_to("/auth/logout")[0];
        assert_eq!(logout.authorization(), Some("Bearer abc123"));
    }

    #[tokio::test]
    async fn test_logout_survives_server_failure() {
        let h = harness(MemoryFlags::default());
        h.session
            .restore(AccessToken::new("abc123"), UserProfile::default())
            .await;
        h.transport.reply(
            "/auth/logout",
            Err(TransportError::ConnectionFailed("offline".to_string())),
        );

        h.auth.logout().await.unwrap();

        assert!(h.session.tokens().get().await.is_none());
        assert!(h.flags.get());
    }

    #[tokio::test]
    async fn test_update_profile_refreshes_session_copy() {
        let h = harness(MemoryFlags::default());
        h.session
            .restore(AccessToken::new("abc123"), UserProfile::default())
            .await;
        h.transport
            .reply_json("/users/profile", 200, &profile_body("Ada"));

        let update = ProfileUpdate::new().set("name", "Ada");
        let profile = h.auth.update_profile(&update).await.unwrap();

        assert_eq!(profile.name, "Ada");
        assert_eq!(h.session.state().await.profile().unwrap().name, "Ada");
        let sent = &h.transport.sent_to("/users/profile")[0];
        assert_eq!(sent.request.method, HttpMethod::Patch);
    }
}
