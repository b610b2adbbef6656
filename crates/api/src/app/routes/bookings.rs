use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use stayhub_auth::Action;
use stayhub_bookings::{
    AmendBooking, BookedResource, Booking, BookingCommand, LifecycleEvent, RequestBooking,
};
use stayhub_core::{BookingId, ListingId};
use stayhub_infra::KeyedStore;

use crate::app::dto::{BookingListQuery, BookingView, CreateBookingRequest, UpdateBookingRequest};
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route(
            "/:id",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/:id/cancel", post(cancel_booking))
        .route("/:id/confirm", post(confirm_booking))
        .route("/:id/reject", post(reject_booking))
}

/// Bookings the caller requested or received, newest first.
pub async fn list_bookings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<BookingListQuery>,
) -> ApiResult {
    let me = principal.principal_id();
    let mut bookings = services
        .bookings
        .list_where(|b| b.involves(me) && query.status.is_none_or(|s| b.status() == s))
        .map_err(errors::store_error_to_response)?;
    bookings.sort_by_key(|b| core::cmp::Reverse(b.requested_at()));

    let views: Vec<BookingView> = bookings.iter().map(BookingView::from).collect();
    Ok(Json(views).into_response())
}

pub async fn create_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateBookingRequest>,
) -> ApiResult {
    let listing_id: ListingId = errors::parse_id(&body.listing_id)?;
    let listing = services
        .listings
        .get(&listing_id)
        .map_err(errors::store_error_to_response)?
        .ok_or_else(errors::not_found)?;

    let cmd = RequestBooking {
        booking_id: BookingId::new(),
        requester: *principal.principal(),
        resource: BookedResource {
            listing_id,
            kind: listing.kind,
            owner: listing.owner,
        },
        check_in: body.check_in,
        check_out: body.check_out,
        guests: body.guests,
        note: body.note,
        occurred_at: Utc::now(),
    };

    let booking = services
        .request_booking(&cmd)
        .map_err(errors::domain_error_to_response)?;

    Ok((StatusCode::CREATED, Json(BookingView::from(&booking))).into_response())
}

pub async fn get_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: BookingId = errors::parse_id(&id)?;
    let booking = load(&services, id)?;
    authz::authorize_request(&principal, Action::ViewBooking, &booking.target())?;
    Ok(Json(BookingView::from(&booking)).into_response())
}

pub async fn update_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBookingRequest>,
) -> ApiResult {
    let id: BookingId = errors::parse_id(&id)?;

    let cmd = BookingCommand::Amend(AmendBooking {
        actor: *principal.principal(),
        check_in: body.check_in,
        check_out: body.check_out,
        guests: body.guests,
        note: body.note,
        occurred_at: Utc::now(),
    });

    let booking = services
        .handle_booking(id, &cmd)
        .map_err(errors::booking_error_to_response)?;
    Ok(Json(BookingView::from(&booking)).into_response())
}

pub async fn delete_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: BookingId = errors::parse_id(&id)?;
    services
        .remove_booking(id, principal.principal())
        .map_err(|e| {
            tracing::info!(booking_id = %id, error = %e, "booking delete refused");
            errors::booking_error_to_response(e)
        })?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn cancel_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    change_status(&services, &principal, &id, LifecycleEvent::Cancel)
}

pub async fn confirm_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    change_status(&services, &principal, &id, LifecycleEvent::Confirm)
}

pub async fn reject_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    change_status(&services, &principal, &id, LifecycleEvent::Reject)
}

/// The role screen runs before the id is parsed or looked up, so a caller
/// without the role learns nothing about which bookings exist.
fn change_status(
    services: &AppServices,
    principal: &PrincipalContext,
    raw_id: &str,
    event: LifecycleEvent,
) -> ApiResult {
    authz::screen_request(principal, event.action())?;
    let id: BookingId = errors::parse_id(raw_id)?;

    let booking = services
        .change_status(id, event, principal.principal())
        .map_err(|e| {
            tracing::info!(booking_id = %id, %event, error = %e, "status change refused");
            errors::booking_error_to_response(e)
        })?;

    Ok(Json(BookingView::from(&booking)).into_response())
}

fn load(services: &AppServices, id: BookingId) -> Result<Booking, axum::response::Response> {
    services
        .bookings
        .get(&id)
        .map_err(errors::store_error_to_response)?
        .ok_or_else(errors::not_found)
}
