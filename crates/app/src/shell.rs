//! Application shell.
//!
//! Owns navigation and user-visible notices. The session layer never
//! navigates on its own; the shell reacts to [`SessionEvent`]s instead.

use roomly_application::{HistoryMode, Redirect, SessionEvent};
use roomly_domain::{SessionState, UserProfile, routes};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Whether `state` may view `path`. The owner console needs `HOTEL_MANAGER`.
#[must_use]
pub fn route_allowed(path: &str, state: &SessionState) -> bool {
    !routes::is_owner_console(path) || state.profile().is_some_and(UserProfile::is_hotel_manager)
}

/// Client-side route history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    entries: Vec<String>,
}

impl Navigator {
    /// Start with a single entry.
    #[must_use]
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            entries: vec![start.into()],
        }
    }

    /// The route being shown.
    #[must_use]
    pub fn current(&self) -> &str {
        self.entries.last().map_or(routes::HOME, String::as_str)
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Add a new entry.
    pub fn push(&mut self, path: impl Into<String>) {
        self.entries.push(path.into());
    }

    /// Overwrite the current entry.
    pub fn replace(&mut self, path: impl Into<String>) {
        let path = path.into();
        match self.entries.last_mut() {
            Some(current) => *current = path,
            None => self.entries.push(path),
        }
    }

    /// Go back one entry. Returns the new current route, or `None` at the
    /// start of history.
    pub fn back(&mut self) -> Option<&str> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop();
        Some(self.current())
    }

    /// Follow a redirect requested by the session layer.
    pub fn follow(&mut self, redirect: &Redirect) {
        match redirect.mode {
            HistoryMode::Push => self.push(redirect.path.clone()),
            HistoryMode::Replace => self.replace(redirect.path.clone()),
        }
    }
}

/// Reacts to session events with navigation and notices.
#[derive(Debug)]
pub struct AppShell {
    navigator: Navigator,
    user: Option<UserProfile>,
    notices: Vec<String>,
}

impl AppShell {
    /// Create a shell showing `start`.
    #[must_use]
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            navigator: Navigator::new(start),
            user: None,
            notices: Vec::new(),
        }
    }

    /// Route history.
    #[must_use]
    pub const fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// The signed-in user as last announced.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Notices shown so far.
    #[must_use]
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Apply one session event.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LoggedIn(profile) => {
                tracing::debug!(email = %profile.email, "shell: signed in");
                self.user = Some(profile);
                self.navigator.push(routes::HOME);
            }
            SessionEvent::LoggedOut => {
                self.user = None;
                self.navigator.push(routes::LOGIN);
            }
            SessionEvent::Expired { notice, redirect } => {
                tracing::info!(%notice, to = %redirect.path, "shell: session expired");
                self.user = None;
                self.notices.push(notice);
                self.navigator.follow(&redirect);
            }
        }
    }

    /// Open `path`, enforcing the owner-console role guard.
    ///
    /// Returns the route actually shown.
    pub fn open(&mut self, path: &str, state: &SessionState) -> &str {
        self.navigator.push(path);
        if !route_allowed(path, state) {
            tracing::debug!(path, "owner console requires HOTEL_MANAGER");
            self.navigator.replace(routes::HOME);
        }
        self.navigator.current()
    }

    /// Apply every event already waiting on `events`.
    pub fn drain(&mut self, events: &mut broadcast::Receiver<SessionEvent>) {
        loop {
            match events.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "shell missed session events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    /// Apply events until the session hub is dropped.
    pub async fn follow(mut self, mut events: broadcast::Receiver<SessionEvent>) -> Self {
        loop {
            match events.recv().await {
                Ok(event) => self.apply(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "shell missed session events");
                }
                Err(RecvError::Closed) => return self,
            }
        }
    }
}
