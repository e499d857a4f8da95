//! Wire envelopes used by the booking backend.
//!
//! Successful responses wrap their payload as `{"data": ...}`; failures carry
//! `{"error": {"message": ...}}`.

use serde::{Deserialize, Serialize};

use crate::auth::AccessToken;

/// `{"data": T}` success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The wrapped payload
    pub data: T,
}

/// Token-bearing payload returned by login, Google login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    /// Access token field used by password login and refresh
    #[serde(default)]
    pub access_token: Option<String>,
    /// Alternate field name used by the Google login endpoint
    #[serde(default)]
    pub token: Option<String>,
}

impl TokenPayload {
    /// Returns the usable `accessToken`, if present and non-blank.
    #[must_use]
    pub fn access_token(&self) -> Option<AccessToken> {
        self.access_token.as_deref().and_then(AccessToken::parse)
    }

    /// Returns `token`, falling back to `accessToken`.
    #[must_use]
    pub fn any_token(&self) -> Option<AccessToken> {
        self.token
            .as_deref()
            .and_then(AccessToken::parse)
            .or_else(|| self.access_token())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// `{"error": {"message": ...}}` failure envelope.
#[derive(Debug, Deserialize)]
pub struct BackendError {
    #[serde(default)]
    error: Option<ErrorBody>,
}

impl BackendError {
    /// Extracts the backend's user-facing message from a raw body.
    #[must_use]
    pub fn message_from(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .and_then(|e| e.error)
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
    }
}
