//! Wiring of the session layer into one client instance.

use std::sync::Arc;

use roomly_application::ports::{Clock, SessionFlagStore, Transport};
use roomly_application::{
    ApiClient, AuthService, AutoLogin, BookingApi, OwnerApi, RefreshClient,
    RefreshCoordinator, SessionContext,
};
use roomly_domain::Endpoints;

/// Every service of a running client, sharing one session.
#[derive(Debug)]
pub struct Roomly {
    /// Token, signed-in user and event hub
    pub session: Arc<SessionContext>,
    /// Authenticated request client
    pub api: ApiClient,
    /// Login, logout and profile operations
    pub auth: AuthService,
    /// Hotel search and booking endpoints
    pub bookings: BookingApi,
    /// Hotel, room and inventory management
    pub owner: OwnerApi,
    /// Startup session restore
    pub auto_login: AutoLogin,
}

impl Roomly {
    /// Build a client on top of the given adapters.
    ///
    /// The API client and the refresh client use the same transport, so
    /// cookies set by login are sent with refresh requests.
    #[must_use]
    pub fn assemble(
        transport: Arc<dyn Transport>,
        flags: Arc<dyn SessionFlagStore>,
        clock: Arc<dyn Clock>,
        endpoints: Endpoints,
    ) -> Self {
        let session = Arc::new(SessionContext::new(clock));
        let refresher = Arc::new(RefreshCoordinator::new(
            RefreshClient::new(transport.clone(), endpoints.refresh.clone()),
            session.tokens().clone(),
        ));
        let api = ApiClient::new(transport, session.clone(), refresher.clone(), endpoints);
        let auth = AuthService::new(api.clone(), refresher.clone(), flags.clone());
        let bookings = BookingApi::new(api.clone());
        let owner = OwnerApi::new(api.clone());
        let auto_login = AutoLogin::new(api.clone(), refresher, flags);

        Self {
            session,
            api,
            auth,
            bookings,
            owner,
            auto_login,
        }
    }
}
