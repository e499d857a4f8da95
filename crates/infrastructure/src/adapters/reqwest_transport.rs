//! HTTP transport implementation using reqwest.
//!
//! Two reqwest clients share one cookie jar. The credentialed client sends
//! and stores cookies, which is how the HTTP-only refresh cookie set by the
//! login endpoint reaches the refresh endpoint. The plain client never
//! touches the jar. The jar can be exported and imported as an opaque
//! snapshot; the refresh credential itself is never read out of it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use roomly_application::ports::{CredentialsMode, Transport, TransportError};
use roomly_domain::{ApiRequest, ApiResponse, Header, Headers, HttpMethod};

use super::cookie_jar::{CookieJarError, PersistentCookieJar};

/// Reqwest-backed [`Transport`] bound to one backend origin.
pub struct ReqwestTransport {
    base_url: Url,
    plain: Client,
    credentialed: Client,
    jar: Arc<PersistentCookieJar>,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Creates a transport for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if a reqwest client cannot be built.
    pub fn new(base_url: Url, user_agent: &str) -> Result<Self, TransportError> {
        let jar = Arc::new(PersistentCookieJar::new());
        let plain = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        let credentialed = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            base_url,
            plain,
            credentialed,
            jar,
            timeout: None,
        })
    }

    /// Applies a per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The backend origin.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Snapshot of every cookie the backend has set, with attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the jar cannot be serialized.
    pub fn export_cookies(&self) -> Result<Option<String>, CookieJarError> {
        self.jar.snapshot()
    }

    /// Replaces the jar with a snapshot from [`export_cookies`](Self::export_cookies).
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    pub fn import_cookies(&self, snapshot: &str) -> Result<(), CookieJarError> {
        self.jar.restore(snapshot)
    }

    /// Resolves `path` and `query` against the base URL.
    ///
    /// The base URL's own path is kept as a prefix.
    fn build_url(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {joined}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Maps reqwest errors to [`TransportError`].
    fn map_error(&self, error: &reqwest::Error) -> TransportError {
        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_timeout() {
            let timeout_ms = self
                .timeout
                .map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return TransportError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        credentials: CredentialsMode,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.build_url(request)?;
        let client = match credentials {
            CredentialsMode::Include => &self.credentialed,
            CredentialsMode::Omit => &self.plain,
        };

        let mut builder = client.request(Self::to_reqwest_method(request.method), url);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(&e))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(k, v)| Header::new(k.as_str(), v.to_str().unwrap_or("<binary>")))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("Failed to read body: {e}")))?
            .to_vec();

        tracing::debug!(status, path = %request.path, "response received");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
