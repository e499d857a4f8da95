//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session layer and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod clock;
mod session_flags;
mod transport;

pub use clock::Clock;
pub use session_flags::{SessionFlagError, SessionFlagStore};
pub use transport::{CredentialsMode, Transport, TransportError};
