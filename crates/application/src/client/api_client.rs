//! Authenticated request client.
//!
//! Attaches the current access token to every request and recovers from an
//! expired token with at most one refresh-and-retry per original request.

use std::sync::Arc;

use roomly_domain::{
    AccessToken, ApiRequest, ApiResponse, BackendError, Endpoints, Envelope, HttpMethod,
    request::AUTHORIZATION,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::interceptor::{InFlightRequest, InterceptDecision, decide};
use crate::auth::{RefreshCoordinator, SessionContext};
use crate::error::{ApiError, ApiResult};
use crate::ports::{CredentialsMode, Transport};

/// Client for the booking backend's authenticated endpoints.
///
/// Cheap to clone; clones share the transport, session and refresh state.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<SessionContext>,
    refresher: Arc<RefreshCoordinator>,
    endpoints: Endpoints,
    credentials: CredentialsMode,
}

impl ApiClient {
    /// Create a client.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionContext>,
        refresher: Arc<RefreshCoordinator>,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            transport,
            session,
            refresher,
            endpoints,
            credentials: CredentialsMode::Include,
        }
    }

    /// Override whether cookies travel with regular API calls.
    #[must_use]
    pub const fn with_credentials(mut self, credentials: CredentialsMode) -> Self {
        self.credentials = credentials;
        self
    }

    /// The session this client authenticates with.
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// The configured endpoint paths.
    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Send a request and return its 2xx response.
    ///
    /// # Errors
    ///
    /// Non-2xx responses become [`ApiError::Status`] or
    /// [`ApiError::Unauthorized`]; a failed refresh becomes
    /// [`ApiError::RefreshFailed`] after the session has been invalidated.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let mut in_flight = InFlightRequest::new(request);
        let response = self.dispatch(&mut in_flight, None).await?;
        self.intercept(Some(in_flight), response).await
    }

    /// Apply the 401 rules to a response.
    ///
    /// `in_flight` is `None` when the failure carries no request to retry;
    /// such a 401 is rejected without touching the refresh endpoint.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn intercept(
        &self,
        in_flight: Option<InFlightRequest>,
        response: ApiResponse,
    ) -> ApiResult<ApiResponse> {
        let Some(mut in_flight) = in_flight else {
            return match decide(response.status, None, &self.endpoints) {
                InterceptDecision::PassThrough => Self::into_result(response),
                _ => Err(Self::unauthorized(None, &response)),
            };
        };

        let mut response = response;
        loop {
            match decide(response.status, Some(&in_flight), &self.endpoints) {
                InterceptDecision::PassThrough => return Self::into_result(response),
                InterceptDecision::Reject(reason) => {
                    tracing::debug!(
                        request = %in_flight.request().id,
                        path = %in_flight.request().path,
                        ?reason,
                        "401 not retried"
                    );
                    return Err(Self::unauthorized(Some(&in_flight), &response));
                }
                InterceptDecision::RefreshAndRetry => {
                    in_flight.mark_retried();
                    let token = self.renew(&in_flight).await?;
                    tracing::debug!(
                        request = %in_flight.request().id,
                        path = %in_flight.request().path,
                        "retrying with refreshed token"
                    );
                    response = self.dispatch(&mut in_flight, Some(&token)).await?;
                }
            }
        }
    }

    /// GET `path` and decode the `data` payload.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send); also fails if the body is not `{"data": T}`.
    pub async fn get_data<T: DeserializeOwned>(&self, path: impl Into<String>) -> ApiResult<T> {
        let response = self.send(ApiRequest::get(path)?).await?;
        Self::decode_data(&response)
    }

    /// Send `body` as JSON with `method` and decode the `data` payload.
    ///
    /// # Errors
    ///
    /// See [`get_data`](Self::get_data).
    pub async fn send_data<B, T>(
        &self,
        method: HttpMethod,
        path: impl Into<String>,
        body: &B,
    ) -> ApiResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = ApiRequest::new(method, path)?.with_json(body)?;
        let response = self.send(request).await?;
        Self::decode_data(&response)
    }

    /// Send a bodiless request and return the raw response.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_empty(
        &self,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> ApiResult<ApiResponse> {
        self.send(ApiRequest::new(method, path)?).await
    }

    /// Decode a `{"data": T}` body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body has another shape.
    pub fn decode_data<T: DeserializeOwned>(response: &ApiResponse) -> ApiResult<T> {
        response
            .decode::<Envelope<T>>()
            .map(|envelope| envelope.data)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send the wrapped request, attaching `token` or the stored token.
    async fn dispatch(
        &self,
        in_flight: &mut InFlightRequest,
        token: Option<&AccessToken>,
    ) -> ApiResult<ApiResponse> {
        in_flight.observe_epoch(self.refresher.epoch());

        let mut outgoing = in_flight.request().clone();
        let current = match token {
            Some(token) => Some(token.clone()),
            None => self.session.tokens().get().await,
        };
        match current {
            Some(token) => outgoing.headers.set(AUTHORIZATION, token.bearer_header()),
            None => outgoing.headers.remove(AUTHORIZATION),
        }
        if outgoing.body.is_some() && !outgoing.headers.contains("Content-Type") {
            outgoing.headers.set("Content-Type", "application/json");
        }

        tracing::debug!(
            request = %outgoing.id,
            method = %outgoing.method,
            path = %outgoing.path,
            "sending request"
        );
        Ok(self.transport.send(&outgoing, self.credentials).await?)
    }

    /// Obtain a refreshed token or invalidate the session.
    async fn renew(&self, in_flight: &InFlightRequest) -> ApiResult<AccessToken> {
        let outcome = self
            .refresher
            .refresh_after(in_flight.observed_epoch())
            .await;
        match outcome.result {
            Ok(token) => Ok(token),
            Err(error) => {
                if outcome.performed {
                    self.session.invalidate().await;
                }
                Err(ApiError::RefreshFailed(error))
            }
        }
    }

    fn into_result(response: ApiResponse) -> ApiResult<ApiResponse> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_status(response.status, response.body))
        }
    }

    fn unauthorized(in_flight: Option<&InFlightRequest>, response: &ApiResponse) -> ApiError {
        ApiError::Unauthorized {
            request: in_flight.map(|f| f.request().id),
            message: BackendError::message_from(&response.body),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoints", &self.endpoints)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::auth::{RefreshClient, SESSION_EXPIRED_NOTICE, SessionEvent};
    use crate::error::RefreshError;
    use crate::ports::TransportError;
    use crate::testing::{FixedClock, ScriptedTransport, token_body};
    use pretty_assertions::assert_eq;
    use roomly_domain::routes;
    use serde_json::{Value, json};

    struct Harness {
        transport: Arc<ScriptedTransport>,
        session: Arc<SessionContext>,
        client: ApiClient,
    }

    fn harness() -> Harness {
        let transport = Arc::new(ScriptedTransport::new());
        let session = Arc::new(SessionContext::new(Arc::new(FixedClock)));
        let refresh = RefreshClient::new(transport.clone(), "/auth/refresh");
        let refresher = Arc::new(RefreshCoordinator::new(
            refresh,
            session.tokens().clone(),
        ));
        let client = ApiClient::new(
            transport.clone(),
            session.clone(),
            refresher,
            Endpoints::default(),
        );
        Harness {
            transport,
            session,
            client,
        }
    }

    fn bookings() -> ApiRequest {
        ApiRequest::get("/bookings").unwrap()
    }

    #[tokio::test]
    async fn test_attaches_stored_token() {
        let h = harness();
        h.session.tokens().set(AccessToken::new("abc123")).await;
        h.transport.reply_json("/bookings", 200, &json!({"data": []}));

        h.client.send(bookings()).await.unwrap();

        let sent = h.transport.sent_to("/bookings");
        assert_eq!(sent[0].authorization(), Some("Bearer abc123"));
    }

    #[tokio::test]
    async fn test_sends_unauthenticated_without_token() {
        let h = harness();
        h.transport.reply_json("/bookings", 200, &json!({"data": []}));

        h.client.send(bookings()).await.unwrap();

        assert!(h.transport.sent_to("/bookings")[0].authorization().is_none());
    }

    #[tokio::test]
    async fn test_token_is_reread_for_every_send() {
        let h = harness();
        h.transport.reply_json("/bookings", 200, &json!({"data": []}));
        h.transport.reply_json("/bookings", 200, &json!({"data": []}));

        h.session.tokens().set(AccessToken::new("first")).await;
        h.client.send(bookings()).await.unwrap();
        h.session.tokens().set(AccessToken::new("second")).await;
        h.client.send(bookings()).await.unwrap();

        let auth: Vec<_> = h
            .transport
            .sent_to("/bookings")
            .iter()
            .map(|s| s.authorization().map(String::from))
            .collect();
        assert_eq!(
            auth,
            vec![Some("Bearer first".to_string()), Some("Bearer second".to_string())]
        );
    }

    #[tokio::test]
    async fn test_401_refreshes_and_retries_with_new_token() {
        let h = harness();
        h.session.tokens().set(AccessToken::new("old")).await;
        h.transport
            .reply_json("/bookings", 401, &json!({}))
            .reply_json("/bookings", 200, &json!({"data": {"id": 9}}))
            .reply_json("/auth/refresh", 200, &token_body("new1"));

        let response = h.client.send(bookings()).await.unwrap();

        assert_eq!(response.status, 200);
        let data: Value = ApiClient::decode_data(&response).unwrap();
        assert_eq!(data, json!({"id": 9}));

        let sent = h.transport.sent_to("/bookings");
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].authorization(), Some("Bearer old"));
        assert_eq!(sent[1].authorization(), Some("Bearer new1"));
        assert_eq!(sent[0].request.id, sent[1].request.id);
        assert_eq!(h.session.tokens().get().await.unwrap().as_str(), "new1");
    }

    #[tokio::test]
    async fn test_repeated_401_refreshes_once_and_retries_once() {
        let h = harness();
        h.session.tokens().set(AccessToken::new("old")).await;
        h.transport
            .respond_with("/bookings", |_| Ok(ApiResponse::new(401, Vec::new())))
            .respond_with("/auth/refresh", |_| {
                Ok(ApiResponse::json(200, &token_body("new1")))
            });

        let err = h.client.send(bookings()).await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized { request: Some(_), .. }));
        assert_eq!(h.transport.sent_to("/auth/refresh").len(), 1);
        assert_eq!(h.transport.sent_to("/bookings").len(), 2);
    }

    #[tokio::test]
    async fn test_no_refresh_for_login_or_refresh_endpoints() {
        let h = harness();
        h.transport
            .reply_json("/auth/login", 401, &json!({"error": {"message": "Bad credentials"}}))
            .reply_json("/auth/refresh", 401, &json!({}));

        let login = ApiRequest::post("/auth/login").unwrap();
        let err = h.client.send(login).await.unwrap_err();
        assert_eq!(err.user_message(), "Bad credentials");

        let refresh = ApiRequest::post("/auth/refresh").unwrap();
        assert!(h.client.send(refresh).await.is_err());

        assert_eq!(h.transport.sent_to("/auth/refresh").len(), 1);
        assert_eq!(h.transport.sent_to("/auth/login").len(), 1);
    }

    #[tokio::test]
    async fn test_401_without_request_is_rejected_quietly() {
        let h = harness();
        let mut events = h.session.events().subscribe();

        let err = h
            .client
            .intercept(None, ApiResponse::new(401, Vec::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized { request: None, .. }));
        assert!(h.transport.sent().is_empty());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_refresh_network_error_forces_logout() {
        let h = harness();
        h.session.tokens().set(AccessToken::new("old")).await;
        let mut events = h.session.events().subscribe();
        let net = TransportError::ConnectionFailed("network down".to_string());
        h.transport
            .reply_json("/bookings", 401, &json!({}))
            .reply("/auth/refresh", Err(net.clone()));

        let err = h.client.send(bookings()).await.unwrap_err();

        match &err {
            ApiError::RefreshFailed(RefreshError::Transport(e)) => assert_eq!(e, &net),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.transport_error(), Some(&net));
        assert_eq!(h.transport.sent_to("/auth/refresh").len(), 1);
        assert_eq!(h.transport.sent_to("/bookings").len(), 1);
        assert!(h.session.tokens().get().await.is_none());

        match events.recv().await.unwrap() {
            SessionEvent::Expired { notice, redirect } => {
                assert_eq!(notice, SESSION_EXPIRED_NOTICE);
                assert_eq!(redirect.path, routes::LOGIN);
                assert_eq!(redirect.mode, crate::auth::HistoryMode::Replace);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_without_token_is_a_failure() {
        let h = harness();
        h.transport
            .reply_json("/bookings", 401, &json!({}))
            .reply_json("/auth/refresh", 200, &json!({"data": {"accessToken": null}}));

        let err = h.client.send(bookings()).await.unwrap_err();

        assert!(matches!(err, ApiError::RefreshFailed(RefreshError::MissingToken)));
        assert_eq!(h.transport.sent_to("/bookings").len(), 1);
    }

    #[tokio::test]
    async fn test_business_errors_pass_through() {
        let h = harness();
        h.transport.reply_json(
            "/bookings",
            409,
            &json!({"error": {"message": "Room no longer available"}}),
        );

        let err = h.client.send(bookings()).await.unwrap_err();

        assert_eq!(err.status(), Some(409));
        assert_eq!(err.user_message(), "Room no longer available");
        assert!(h.transport.sent_to("/auth/refresh").is_empty());
    }

    #[tokio::test]
    async fn test_transport_errors_pass_through() {
        let h = harness();
        let timeout = TransportError::Timeout { timeout_ms: 10 };
        h.transport.reply("/bookings", Err(timeout.clone()));

        let err = h.client.send(bookings()).await.unwrap_err();

        assert_eq!(err.transport_error(), Some(&timeout));
        assert!(h.transport.sent_to("/auth/refresh").is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let h = harness();
        h.session.tokens().set(AccessToken::new("old")).await;
        h.transport
            .respond_with("/bookings", |request| {
                if request.headers.get("Authorization") == Some("Bearer new1") {
                    Ok(ApiResponse::json(200, &json!({"data": []})))
                } else {
                    Ok(ApiResponse::new(401, Vec::new()))
                }
            })
            .delay("/bookings", Duration::from_millis(20))
            .respond_with("/auth/refresh", |_| {
                Ok(ApiResponse::json(200, &token_body("new1")))
            })
            .delay("/auth/refresh", Duration::from_millis(20));

        let (a, b, c) = tokio::join!(
            h.client.send(bookings()),
            h.client.send(bookings()),
            h.client.send(bookings()),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(h.transport.sent_to("/auth/refresh").len(), 1);
        assert_eq!(h.transport.sent_to("/bookings").len(), 6);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_failure_publishes_one_expiry() {
        let h = harness();
        h.session.tokens().set(AccessToken::new("old")).await;
        let mut events = h.session.events().subscribe();
        h.transport
            .respond_with("/bookings", |_| Ok(ApiResponse::new(401, Vec::new())))
            .delay("/bookings", Duration::from_millis(20))
            .respond_with("/auth/refresh", |_| Ok(ApiResponse::new(401, Vec::new())));

        let (a, b) = tokio::join!(h.client.send(bookings()), h.client.send(bookings()));

        assert!(matches!(a, Err(ApiError::RefreshFailed(_))));
        assert!(matches!(b, Err(ApiError::RefreshFailed(_))));
        assert_eq!(h.transport.sent_to("/auth/refresh").len(), 1);
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::Expired { .. }));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_json_body_sets_content_type() {
        let h = harness();
        h.transport.reply_json("/hotels/search", 200, &json!({"data": []}));

        let _: Vec<Value> = h
            .client
            .send_data(HttpMethod::Post, "/hotels/search", &json!({"city": "Goa"}))
            .await
            .unwrap();

        let sent = h.transport.sent_to("/hotels/search");
        assert_eq!(sent[0].request.headers.get("content-type"), Some("application/json"));
        assert_eq!(sent[0].request.body, Some(json!({"city": "Goa"})));
    }
}
