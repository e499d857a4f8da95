//! Roomly Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;

pub use adapters::{CookieJarError, PersistentCookieJar, ReqwestTransport, SystemClock};
pub use crate::config::{ConfigError, RoomlyConfig};
pub use persistence::{FileSessionStore, FlagStoreError, MemorySessionFlags, SessionFile};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
