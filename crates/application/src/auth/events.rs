//! Session lifecycle events.
//!
//! The transport layer never navigates. It publishes events here and the
//! application shell decides how to react.

use roomly_domain::{UserProfile, routes};
use tokio::sync::broadcast;

/// Notice shown to the user when the session cannot be renewed.
pub const SESSION_EXPIRED_NOTICE: &str = "Session expired. Please log in again.";

const CHANNEL_CAPACITY: usize = 16;

/// How a navigation affects the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Add a new entry; "back" returns to the current view.
    Push,
    /// Overwrite the current entry; "back" skips the current view.
    Replace,
}

/// Navigation requested by the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Target route
    pub path: String,
    /// History behaviour
    pub mode: HistoryMode,
}

impl Redirect {
    /// Redirect to the login view that replaces the current entry.
    #[must_use]
    pub fn replace_with_login() -> Self {
        Self {
            path: routes::LOGIN.to_string(),
            mode: HistoryMode::Replace,
        }
    }
}

/// Something happened to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user signed in interactively or via the OAuth callback.
    LoggedIn(UserProfile),
    /// The user logged out explicitly.
    LoggedOut,
    /// The session was invalidated after a failed refresh.
    Expired {
        /// Message to show before redirecting
        notice: String,
        /// Where to send the user
        redirect: Redirect,
    },
}

/// Broadcast hub for [`SessionEvent`]s.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Create a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("session event dropped: no subscribers");
        }
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
