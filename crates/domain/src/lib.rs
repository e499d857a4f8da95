//! Roomly Domain - Core client types
//!
//! This crate defines the domain model for the Roomly booking client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod booking;
pub mod endpoints;
pub mod error;
pub mod owner;
pub mod request;
pub mod response;

pub use auth::{
    AccessToken, AnonymousReason, BootstrapOutcome, BootstrapStatus, GoogleLogin,
    LoginCredentials, ProfileUpdate, SessionState, UserProfile,
};
pub use booking::{BookingInit, HotelSearchQuery};
pub use endpoints::{Endpoints, routes};
pub use error::{DomainError, DomainResult};
pub use owner::ReportPeriod;
pub use request::{ApiRequest, Header, Headers, HttpMethod, RequestId};
pub use response::{ApiResponse, BackendError, Envelope, TokenPayload};
