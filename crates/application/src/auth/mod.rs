//! Session lifecycle for the Roomly client.
//!
//! This module provides:
//! - In-memory access token storage
//! - The shared session context and its event hub
//! - Cookie-based token refresh with single-flight coordination
//! - Startup auto-login and the interactive auth operations

mod bootstrap;
mod events;
mod refresh;
mod service;
mod session;
mod token_store;

pub use bootstrap::AutoLogin;
pub use events::{HistoryMode, Redirect, SESSION_EXPIRED_NOTICE, SessionEvent, SessionEvents};
pub use refresh::{Coalesced, RefreshClient, RefreshCoordinator};
pub use service::AuthService;
pub use session::SessionContext;
pub use token_store::TokenStore;
