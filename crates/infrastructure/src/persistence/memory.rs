//! In-memory flag store for embedders that keep nothing on disk.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use roomly_application::ports::{SessionFlagError, SessionFlagStore};

/// [`SessionFlagStore`] that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemorySessionFlags {
    logged_out: AtomicBool,
}

impl MemorySessionFlags {
    /// Creates a store with the flag cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionFlagStore for MemorySessionFlags {
    async fn is_logged_out(&self) -> Result<bool, SessionFlagError> {
        Ok(self.logged_out.load(Ordering::Acquire))
    }

    async fn set_logged_out(&self, logged_out: bool) -> Result<(), SessionFlagError> {
        self.logged_out.store(logged_out, Ordering::Release);
        Ok(())
    }
}
