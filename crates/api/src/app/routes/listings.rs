//! Residence and activity routes. The same router serves both kinds; the
//! kind arrives as a router-level extension.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use stayhub_auth::Action;
use stayhub_catalog::{Listing, ListingDraft, ListingPatch};
use stayhub_core::{ListingId, ListingKind};
use stayhub_infra::KeyedStore;

use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_listings).post(create_listing))
        .route(
            "/:id",
            get(get_listing).put(update_listing).delete(delete_listing),
        )
}

pub async fn list_listings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(kind): Extension<ListingKind>,
) -> ApiResult {
    let mut listings = services
        .listings
        .list_where(&|l| l.kind == kind)
        .map_err(errors::store_error_to_response)?;
    listings.sort_by_key(|l| l.created_at);
    Ok(Json(listings).into_response())
}

pub async fn get_listing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(kind): Extension<ListingKind>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: ListingId = errors::parse_id(&id)?;
    let listing = load(&services, kind, id)?;
    Ok(Json(listing).into_response())
}

pub async fn create_listing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(kind): Extension<ListingKind>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ListingDraft>,
) -> ApiResult {
    authz::screen_request(&principal, Action::CreateResource)?;

    let listing = Listing::new(kind, principal.principal_id(), body, Utc::now())
        .map_err(errors::domain_error_to_response)?;
    services
        .listings
        .insert(listing.id, listing.clone())
        .map_err(errors::store_error_to_response)?;

    tracing::info!(listing_id = %listing.id, %kind, owner = %listing.owner, "listing created");
    Ok((StatusCode::CREATED, Json(listing)).into_response())
}

pub async fn update_listing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(kind): Extension<ListingKind>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<ListingPatch>,
) -> ApiResult {
    authz::screen_request(&principal, Action::UpdateResource)?;
    let id: ListingId = errors::parse_id(&id)?;

    let mut listing = load(&services, kind, id)?;
    authz::authorize_request(&principal, Action::UpdateResource, &listing.target())?;

    listing
        .update(body, Utc::now())
        .map_err(errors::domain_error_to_response)?;
    services
        .listings
        .replace(&id, listing.clone())
        .map_err(errors::store_error_to_response)?;

    Ok(Json(listing).into_response())
}

pub async fn delete_listing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(kind): Extension<ListingKind>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    authz::screen_request(&principal, Action::DeleteResource)?;
    let id: ListingId = errors::parse_id(&id)?;

    let listing = load(&services, kind, id)?;
    authz::authorize_request(&principal, Action::DeleteResource, &listing.target())?;

    services
        .listings
        .remove(&id)
        .map_err(errors::store_error_to_response)?;

    tracing::info!(listing_id = %id, %kind, "listing deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// A listing of the wrong kind is reported as missing.
fn load(
    services: &AppServices,
    kind: ListingKind,
    id: ListingId,
) -> Result<Listing, axum::response::Response> {
    services
        .listings
        .get(&id)
        .map_err(errors::store_error_to_response)?
        .filter(|l| l.kind == kind)
        .ok_or_else(errors::not_found)
}
