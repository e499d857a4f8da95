//! Session state types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role that unlocks the owner console.
pub const HOTEL_MANAGER_ROLE: &str = "HOTEL_MANAGER";

/// Profile of the signed-in user as returned by `GET /users/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend identifier; numeric or string depending on the deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Login email
    #[serde(default)]
    pub email: String,
    /// Granted roles (e.g. `GUEST`, `HOTEL_MANAGER`)
    #[serde(default)]
    pub roles: Vec<String>,
    /// Fields the client does not interpret but keeps for display.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl UserProfile {
    /// Returns true if the user holds the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns true if the user may open the owner console.
    #[must_use]
    pub fn is_hotel_manager(&self) -> bool {
        self.has_role(HOTEL_MANAGER_ROLE)
    }

    /// Initials used by the navigation avatar.
    #[must_use]
    pub fn initials(&self) -> String {
        let mut parts = self.name.split_whitespace();
        let first = parts.next().and_then(|p| p.chars().next());
        let second = parts.next().and_then(|p| p.chars().next());
        first
            .into_iter()
            .chain(second)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Application-wide view of who is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No authenticated user.
    #[default]
    Anonymous,
    /// A user is signed in.
    LoggedIn(UserProfile),
}

impl SessionState {
    /// Returns true if a user is signed in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }

    /// Returns the signed-in profile, if any.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::LoggedIn(profile) => Some(profile),
            Self::Anonymous => None,
        }
    }
}

/// Why the startup bootstrap ended without a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnonymousReason {
    /// The user explicitly logged out earlier; no silent refresh was tried.
    LoggedOutFlag,
    /// The refresh endpoint did not hand out a usable token.
    RefreshRejected(String),
    /// A token was obtained but the profile could not be loaded.
    ProfileUnavailable(String),
}

/// Result of the one-shot startup bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A session was restored silently.
    LoggedIn(UserProfile),
    /// No session could be restored; this is the normal signed-out path.
    Anonymous(AnonymousReason),
    /// The OAuth callback view performs its own token exchange.
    Skipped,
}

impl BootstrapOutcome {
    /// Returns true if the bootstrap restored a session.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }
}

/// Loading indicator published while the bootstrap runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BootstrapStatus {
    /// Bootstrap still running; protected views must wait.
    #[default]
    Loading,
    /// Bootstrap finished with the given outcome.
    Ready(BootstrapOutcome),
}

impl BootstrapStatus {
    /// Returns true once the bootstrap has finished.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}
