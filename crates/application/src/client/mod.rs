//! Authenticated HTTP client for the booking backend.

mod api_client;
mod interceptor;

pub use api_client::ApiClient;
pub use interceptor::{InFlightRequest, InterceptDecision, RejectReason, decide};
