//! System clock adapter

use chrono::{DateTime, Utc};
use roomly_application::ports::Clock;

/// Wall clock used to stamp when a session was established.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
