//! 401 handling rules.
//!
//! Each original request is wrapped in an [`InFlightRequest`] that carries
//! a one-shot retry marker. [`decide`] maps a response status and that
//! wrapper to what the client must do next.

use roomly_domain::{ApiRequest, Endpoints, response::UNAUTHORIZED};

/// An original request plus the state needed to retry it at most once.
#[derive(Debug, Clone)]
pub struct InFlightRequest {
    request: ApiRequest,
    retried: bool,
    observed_epoch: u64,
}

impl InFlightRequest {
    /// Wrap a request that has not been sent yet.
    #[must_use]
    pub const fn new(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
            observed_epoch: 0,
        }
    }

    /// The original request as the caller built it.
    #[must_use]
    pub const fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// Whether the refresh-and-retry cycle already ran.
    #[must_use]
    pub const fn is_retried(&self) -> bool {
        self.retried
    }

    /// Consume the retry marker. Returns false if it was already used.
    pub const fn mark_retried(&mut self) -> bool {
        let first = !self.retried;
        self.retried = true;
        first
    }

    /// Refresh epoch seen when the request was last sent.
    #[must_use]
    pub const fn observed_epoch(&self) -> u64 {
        self.observed_epoch
    }

    pub(crate) const fn observe_epoch(&mut self, epoch: u64) {
        self.observed_epoch = epoch;
    }
}

/// Why a 401 is rejected without a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The error carried no request, so there is nothing to retry.
    MissingRequest,
    /// The request already went through one refresh-and-retry.
    AlreadyRetried,
    /// The request targeted the login or refresh endpoint itself.
    AuthEndpoint,
}

/// What to do with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptDecision {
    /// Not a 401; hand the response to the caller unchanged.
    PassThrough,
    /// A 401 that must not be retried.
    Reject(RejectReason),
    /// Refresh the token and send the request once more.
    RefreshAndRetry,
}

/// Decide how to treat a response with `status` for `in_flight`.
#[must_use]
pub fn decide(
    status: u16,
    in_flight: Option<&InFlightRequest>,
    endpoints: &Endpoints,
) -> InterceptDecision {
    if status != UNAUTHORIZED {
        return InterceptDecision::PassThrough;
    }
    let Some(in_flight) = in_flight else {
        return InterceptDecision::Reject(RejectReason::MissingRequest);
    };
    if in_flight.is_retried() {
        return InterceptDecision::Reject(RejectReason::AlreadyRetried);
    }
    let request = in_flight.request();
    if request.targets(&endpoints.login) || request.targets(&endpoints.refresh) {
        return InterceptDecision::Reject(RejectReason::AuthEndpoint);
    }
    InterceptDecision::RefreshAndRetry
}
