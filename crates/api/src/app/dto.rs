use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stayhub_bookings::{Booking, BookingStatus};
use stayhub_core::AggregateRoot;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub listing_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookingRequest {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<u32>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Serialize)]
pub struct BookingView {
    pub id: String,
    pub listing_id: String,
    pub listing_kind: &'static str,
    pub requester: String,
    pub provider: String,
    pub status: BookingStatus,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub note: Option<String>,
    pub version: u64,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for BookingView {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id_typed().to_string(),
            listing_id: b.resource().listing_id.to_string(),
            listing_kind: b.resource().kind.as_str(),
            requester: b.requester().to_string(),
            provider: b.resource().owner.to_string(),
            status: b.status(),
            check_in: b.check_in(),
            check_out: b.check_out(),
            guests: b.guests(),
            note: b.note().map(str::to_string),
            version: b.version(),
            requested_at: b.requested_at(),
            updated_at: b.updated_at(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub listing_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub listing_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkRequest {
    pub listing_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,
}
