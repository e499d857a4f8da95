//! Search and booking request payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Body of `POST /hotels/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchQuery {
    /// City to search in
    pub city: String,
    /// First night
    pub start_date: NaiveDate,
    /// Checkout day
    pub end_date: NaiveDate,
    /// Number of rooms wanted
    pub rooms_count: u32,
}

impl HotelSearchQuery {
    /// Builds a validated search query.
    ///
    /// # Errors
    ///
    /// Returns an error if the city is blank, the range is empty, or no room
    /// is requested.
    pub fn new(
        city: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        rooms_count: u32,
    ) -> DomainResult<Self> {
        let city = city.into();
        if city.trim().is_empty() {
            return Err(DomainError::InvalidBookingParameter(
                "city is required".to_string(),
            ));
        }
        validate_stay(start_date, end_date, rooms_count)?;
        Ok(Self {
            city,
            start_date,
            end_date,
            rooms_count,
        })
    }

    /// Number of nights covered by the search.
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// Body of `POST /bookings/init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInit {
    /// Hotel being booked
    pub hotel_id: i64,
    /// Room type being booked
    pub room_id: i64,
    /// Check-in day
    pub check_in_date: NaiveDate,
    /// Check-out day
    pub check_out_date: NaiveDate,
    /// Number of rooms
    pub rooms_count: u32,
}

impl BookingInit {
    /// Builds a validated booking request.
    ///
    /// # Errors
    ///
    /// Returns an error if the stay is empty or no room is requested.
    pub fn new(
        hotel_id: i64,
        room_id: i64,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        rooms_count: u32,
    ) -> DomainResult<Self> {
        validate_stay(check_in_date, check_out_date, rooms_count)?;
        Ok(Self {
            hotel_id,
            room_id,
            check_in_date,
            check_out_date,
            rooms_count,
        })
    }
}

fn validate_stay(start: NaiveDate, end: NaiveDate, rooms_count: u32) -> DomainResult<()> {
    if end <= start {
        return Err(DomainError::InvalidBookingParameter(format!(
            "end date {end} must be after start date {start}"
        )));
    }
    if rooms_count == 0 {
        return Err(DomainError::InvalidBookingParameter(
            "at least one room is required".to_string(),
        ));
    }
    Ok(())
}
