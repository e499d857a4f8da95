//! Roomly Application - Session lifecycle and API access
//!
//! This crate owns the access token, the 401 refresh-and-retry policy,
//! the startup auto-login and the auth, booking and owner console operations
//! built on top.
//! External systems are reached only through the traits in [`ports`].

pub mod auth;
pub mod booking;
pub mod client;
pub mod error;
pub mod owner;
pub mod ports;

#[cfg(test)]
mod testing;

pub use auth::{
    AuthService, AutoLogin, HistoryMode, Redirect, RefreshClient, RefreshCoordinator,
    SESSION_EXPIRED_NOTICE, SessionContext, SessionEvent, SessionEvents, TokenStore,
};
pub use booking::BookingApi;
pub use client::ApiClient;
pub use error::{ApiError, ApiResult, RefreshError};
pub use owner::OwnerApi;
