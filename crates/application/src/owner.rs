//! Owner console endpoints.
//!
//! Hotel, room and inventory management for accounts holding the
//! `HOTEL_MANAGER` role. The backend enforces the role; callers are
//! expected to gate the console on [`UserProfile::is_hotel_manager`]
//! before reaching these calls.
//!
//! [`UserProfile::is_hotel_manager`]: roomly_domain::UserProfile::is_hotel_manager

use roomly_domain::{ApiRequest, HttpMethod, ReportPeriod};
use serde::Serialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiResult;

const HOTELS: &str = "/admin/hotels";
const INVENTORY: &str = "/admin/inventory/rooms";

/// Thin wrappers over the `/admin` endpoints.
#[derive(Debug, Clone)]
pub struct OwnerApi {
    api: ApiClient,
}

impl OwnerApi {
    /// Create the wrapper.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /admin/hotels`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn hotels(&self) -> ApiResult<Value> {
        self.api.get_data(HOTELS).await
    }

    /// `GET /admin/hotels/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn hotel(&self, hotel_id: i64) -> ApiResult<Value> {
        self.api.get_data(format!("{HOTELS}/{hotel_id}")).await
    }

    /// `POST /admin/hotels`
    ///
    /// # Errors
    ///
    /// A rejected payload keeps the backend's `error.message`.
    pub async fn create_hotel<B>(&self, hotel: &B) -> ApiResult<Value>
    where
        B: Serialize + Sync,
    {
        self.write(HttpMethod::Post, HOTELS.to_string(), hotel).await
    }

    /// `PUT /admin/hotels/{id}`
    ///
    /// # Errors
    ///
    /// A rejected payload keeps the backend's `error.message`.
    pub async fn update_hotel<B>(&self, hotel_id: i64, hotel: &B) -> ApiResult<Value>
    where
        B: Serialize + Sync,
    {
        self.write(HttpMethod::Put, format!("{HOTELS}/{hotel_id}"), hotel)
            .await
    }

    /// `DELETE /admin/hotels/{id}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn delete_hotel(&self, hotel_id: i64) -> ApiResult<()> {
        self.bodiless(HttpMethod::Delete, format!("{HOTELS}/{hotel_id}"))
            .await
    }

    /// `PATCH /admin/hotels/{id}/activate`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn activate_hotel(&self, hotel_id: i64) -> ApiResult<()> {
        self.bodiless(HttpMethod::Patch, format!("{HOTELS}/{hotel_id}/activate"))
            .await
    }

    /// `PATCH /admin/hotels/{id}/deactivate`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn deactivate_hotel(&self, hotel_id: i64) -> ApiResult<()> {
        self.bodiless(HttpMethod::Patch, format!("{HOTELS}/{hotel_id}/deactivate"))
            .await
    }

    /// `GET /admin/hotels/{id}/bookings`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn hotel_bookings(&self, hotel_id: i64) -> ApiResult<Value> {
        self.api
            .get_data(format!("{HOTELS}/{hotel_id}/bookings"))
            .await
    }

    /// `GET /admin/hotels/{id}/reports?startDate=..&endDate=..`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn hotel_report(&self, hotel_id: i64, period: &ReportPeriod) -> ApiResult<Value> {
        let request = period.query_pairs().into_iter().fold(
            ApiRequest::get(format!("{HOTELS}/{hotel_id}/reports"))?,
            |request, (name, value)| request.with_query(name, value),
        );
        let response = self.api.send(request).await?;
        ApiClient::decode_data(&response)
    }

    /// `GET /admin/hotels/{id}/rooms`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn rooms(&self, hotel_id: i64) -> ApiResult<Value> {
        self.api.get_data(format!("{HOTELS}/{hotel_id}/rooms")).await
    }

    /// `GET /admin/hotels/{id}/rooms/{roomId}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn room(&self, hotel_id: i64, room_id: i64) -> ApiResult<Value> {
        self.api
            .get_data(format!("{HOTELS}/{hotel_id}/rooms/{room_id}"))
            .await
    }

    /// `POST /admin/hotels/{id}/rooms`
    ///
    /// # Errors
    ///
    /// A rejected payload keeps the backend's `error.message`.
    pub async fn create_room<B>(&self, hotel_id: i64, room: &B) -> ApiResult<Value>
    where
        B: Serialize + Sync,
    {
        self.write(HttpMethod::Post, format!("{HOTELS}/{hotel_id}/rooms"), room)
            .await
    }

    /// `PUT /admin/hotels/{id}/rooms/{roomId}`
    ///
    /// # Errors
    ///
    /// A rejected payload keeps the backend's `error.message`.
    pub async fn update_room<B>(&self, hotel_id: i64, room_id: i64, room: &B) -> ApiResult<Value>
    where
        B: Serialize + Sync,
    {
        let path = format!("{HOTELS}/{hotel_id}/rooms/{room_id}");
        self.write(HttpMethod::Put, path, room).await
    }

    /// `DELETE /admin/hotels/{id}/rooms/{roomId}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn delete_room(&self, hotel_id: i64, room_id: i64) -> ApiResult<()> {
        self.bodiless(
            HttpMethod::Delete,
            format!("{HOTELS}/{hotel_id}/rooms/{room_id}"),
        )
        .await
    }

    /// `GET /admin/inventory/rooms/{roomId}`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`](crate::ApiError) from the endpoint.
    pub async fn room_inventory(&self, room_id: i64) -> ApiResult<Value> {
        self.api.get_data(format!("{INVENTORY}/{room_id}")).await
    }

    /// `PATCH /admin/inventory/rooms/{roomId}`
    ///
    /// The backend answers with an empty body.
    ///
    /// # Errors
    ///
    /// A rejected update keeps the backend's `error.message`.
    pub async fn update_room_inventory<B>(&self, room_id: i64, update: &B) -> ApiResult<()>
    where
        B: Serialize + Sync,
    {
        let request = ApiRequest::patch(format!("{INVENTORY}/{room_id}"))?.with_json(update)?;
        Self::log_change(&request);
        self.api.send(request).await?;
        Ok(())
    }

    async fn write<B>(&self, method: HttpMethod, path: String, body: &B) -> ApiResult<Value>
    where
        B: Serialize + Sync,
    {
        let request = ApiRequest::new(method, path)?.with_json(body)?;
        Self::log_change(&request);
        let response = self.api.send(request).await?;
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        ApiClient::decode_data(&response)
    }

    async fn bodiless(&self, method: HttpMethod, path: String) -> ApiResult<()> {
        let request = ApiRequest::new(method, path)?;
        Self::log_change(&request);
        self.api.send(request).await?;
        Ok(())
    }

    fn log_change(request: &ApiRequest) {
        if request.method.changes_state() {
            tracing::info!(method = %request.method, path = %request.path, "owner console change");
        }
    }
}
