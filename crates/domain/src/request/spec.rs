//! Outgoing API request type

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// Identity of one logical API call.
///
/// A retried request keeps the id of the call it retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new time-ordered id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A request against the backend, addressed relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Identity of the logical call
    pub id: RequestId,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the configured base URL, e.g. `/users/profile`
    pub path: String,
    /// Query parameters in insertion order
    #[serde(default)]
    pub query: Vec<(String, String)>,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// JSON body, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Creates a request for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or not rooted at `/`.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> DomainResult<Self> {
        let path = path.into();
        if !path.starts_with('/') || path.trim().len() < 2 {
            return Err(DomainError::InvalidPath(path));
        }
        Ok(Self {
            id: RequestId::new(),
            method,
            path,
            query: Vec::new(),
            headers: Headers::new(),
            body: None,
        })
    }

    /// Creates a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn get(path: impl Into<String>) -> DomainResult<Self> {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn post(path: impl Into<String>) -> DomainResult<Self> {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PATCH request.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn patch(path: impl Into<String>) -> DomainResult<Self> {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a PUT request.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn put(path: impl Into<String>) -> DomainResult<Self> {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn delete(path: impl Into<String>) -> DomainResult<Self> {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Returns true if this request targets `path`, ignoring a trailing slash.
    #[must_use]
    pub fn targets(&self, path: &str) -> bool {
        self.path.trim_end_matches('/') == path.trim_end_matches('/')
    }
}
