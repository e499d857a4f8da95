//! Storage for the durable `loggedOut` flag and saved cookies.

mod memory;
mod session_file;

pub use memory::MemorySessionFlags;
pub use session_file::{FileSessionStore, FlagStoreError, SessionFile};
