//! Authentication domain types

mod credentials;
mod session;
mod token;

pub use credentials::{GoogleLogin, LoginCredentials, ProfileUpdate};
pub use session::{
    AnonymousReason, BootstrapOutcome, BootstrapStatus, HOTEL_MANAGER_ROLE, SessionState,
    UserProfile,
};
pub use token::AccessToken;
