//! Hotel search and booking endpoints.
//!
//! Every call goes through [`ApiClient`], so an expired token is refreshed
//! transparently. Payloads are returned as the backend's `data` value.

use chrono::NaiveDate;
use roomly_domain::{ApiRequest, BookingInit, HotelSearchQuery, HttpMethod};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiResult;

/// Thin wrappers over the booking backend.
#[derive(Debug, Clone)]
pub struct BookingApi {
    api: ApiClient,
}

impl BookingApi {
    /// Create the wrapper.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `POST /hotels/search`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn search_hotels(&self, query: &HotelSearchQuery) -> ApiResult<Value> {
        self.api
            .send_data(HttpMethod::Post, "/hotels/search", query)
            .await
    }

    /// `GET /hotels/search/{id}/info`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn hotel_info(&self, hotel_id: i64) -> ApiResult<Value> {
        self.api
            .get_data(format!("/hotels/search/{hotel_id}/info"))
            .await
    }

    /// `GET /hotels/search/{id}/price?start=..&end=..`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn room_price(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Value> {
        let request = ApiRequest::get(format!("/hotels/search/{room_id}/price"))?
            .with_query("start", start.to_string())
            .with_query("end", end.to_string());
        let response = self.api.send(request).await?;
        ApiClient::decode_data(&response)
    }

    /// `POST /bookings/init`
    ///
    /// # Errors
    ///
    /// A rejected booking keeps the backend's `error.message`.
    pub async fn init_booking(&self, init: &BookingInit) -> ApiResult<Value> {
        tracing::info!(
            hotel = init.hotel_id,
            room = init.room_id,
            rooms = init.rooms_count,
            "initialising booking"
        );
        self.api
            .send_data(HttpMethod::Post, "/bookings/init", init)
            .await
    }

    /// `GET /payment/session/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn payment_session(&self, session_id: &str) -> ApiResult<Value> {
        self.api
            .get_data(format!("/payment/session/{session_id}"))
            .await
    }

    /// `PATCH /users/promote-to-host`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn promote_to_host(&self) -> ApiResult<()> {
        self.api
            .send_empty(HttpMethod::Patch, "/users/promote-to-host")
            .await?;
        Ok(())
    }
}
