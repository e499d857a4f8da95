//! Test doubles for the ports.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roomly_domain::{ApiRequest, ApiResponse};
use serde_json::{Value, json};

use crate::ports::{
    Clock, CredentialsMode, SessionFlagError, SessionFlagStore, Transport, TransportError,
};

/// Clock pinned to 2026-01-01T00:00:00Z.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap()
    }
}

type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync>;

#[derive(Default)]
struct Route {
    queued: VecDeque<Result<ApiResponse, TransportError>>,
    responder: Option<Responder>,
    delay: Option<Duration>,
}

/// A request as it reached the transport.
#[derive(Debug, Clone)]
pub struct Sent {
    pub request: ApiRequest,
    pub credentials: CredentialsMode,
}

impl Sent {
    pub fn authorization(&self) -> Option<&str> {
        self.request.headers.get("Authorization")
    }
}

/// Transport that answers from per-path scripts and records every send.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Route>>,
    sent: Mutex<Vec<Sent>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one reply for `path`; queued replies are used first, in order.
    pub fn reply(&self, path: &str, reply: Result<ApiResponse, TransportError>) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .queued
            .push_back(reply);
        self
    }

    pub fn reply_json(&self, path: &str, status: u16, body: &Value) -> &Self {
        self.reply(path, Ok(ApiResponse::json(status, body)))
    }

    /// Fallback for `path` once its queue is drained.
    pub fn respond_with<F>(&self, path: &str, responder: F) -> &Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .responder = Some(Box::new(responder));
        self
    }

    pub fn delay(&self, path: &str, delay: Duration) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .delay = Some(delay);
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, path: &str) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.request.path == path)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        credentials: CredentialsMode,
    ) -> Result<ApiResponse, TransportError> {
        self.sent.lock().unwrap().push(Sent {
            request: request.clone(),
            credentials,
        });

        let (reply, delay) = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&request.path) {
                Some(route) => {
                    let reply = match route.queued.pop_front() {
                        Some(reply) => reply,
                        None => route.responder.as_ref().map_or_else(
                            || Ok(ApiResponse::new(404, Vec::new())),
                            |respond| respond(request),
                        ),
                    };
                    (reply, route.delay)
                }
                None => (Ok(ApiResponse::new(404, Vec::new())), None),
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

/// In-memory `loggedOut` flag that can be told to fail.
#[derive(Debug, Default)]
pub struct MemoryFlags {
    logged_out: AtomicBool,
    broken: AtomicBool,
}

impl MemoryFlags {
    pub fn logged_out() -> Self {
        let flags = Self::default();
        flags.logged_out.store(true, Ordering::SeqCst);
        flags
    }

    pub fn broken() -> Self {
        let flags = Self::default();
        flags.broken.store(true, Ordering::SeqCst);
        flags
    }

    pub fn get(&self) -> bool {
        self.logged_out.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFlagStore for MemoryFlags {
    async fn is_logged_out(&self) -> Result<bool, SessionFlagError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(SessionFlagError::Storage("disk unavailable".to_string()));
        }
        Ok(self.get())
    }

    async fn set_logged_out(&self, logged_out: bool) -> Result<(), SessionFlagError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(SessionFlagError::Storage("disk unavailable".to_string()));
        }
        self.logged_out.store(logged_out, Ordering::SeqCst);
        Ok(())
    }
}

/// `{"data":{"accessToken": token}}`
pub fn token_body(token: &str) -> Value {
    json!({ "data": { "accessToken": token } })
}

/// `{"data": <profile>}` for a signed-in guest.
pub fn profile_body(name: &str) -> Value {
    json!({
        "data": {
            "id": 7,
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "roles": ["GUEST"]
        }
    })
}
