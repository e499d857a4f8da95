//! Methods the booking backend accepts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method of an [`ApiRequest`](super::ApiRequest).
///
/// The backend speaks plain REST: reads are `GET`, creation is `POST`,
/// full replacement is `PUT`, state toggles and partial edits are `PATCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Read
    Get,
    /// Create or submit
    Post,
    /// Replace
    Put,
    /// Toggle or partially update
    Patch,
    /// Remove
    Delete,
}

impl HttpMethod {
    /// Returns true for methods that change backend state.
    #[must_use]
    pub const fn changes_state(self) -> bool {
        !matches!(self, Self::Get)
    }

    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
