//! HTTP Response domain types

mod envelope;
mod spec;

pub use envelope::{BackendError, Envelope, TokenPayload};
pub use spec::{ApiResponse, UNAUTHORIZED};
