use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use stayhub_auth::{Action, Target};
use stayhub_catalog::{Review, ReviewPatch};
use stayhub_core::{ListingId, Owned, ReviewId};
use stayhub_infra::KeyedStore;

use crate::app::dto::{CreateReviewRequest, ReviewListQuery};
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/:id", put(update_review).delete(delete_review))
}

pub async fn list_reviews(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReviewListQuery>,
) -> ApiResult {
    let listing: Option<ListingId> = match query.listing_id.as_deref() {
        Some(raw) => Some(errors::parse_id(raw)?),
        None => None,
    };

    let mut reviews = services
        .reviews
        .list_where(&|r| listing.is_none_or(|l| r.listing_id == l))
        .map_err(errors::store_error_to_response)?;
    reviews.sort_by_key(|r| core::cmp::Reverse(r.created_at));
    Ok(Json(reviews).into_response())
}

pub async fn create_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateReviewRequest>,
) -> ApiResult {
    let listing_id: ListingId = errors::parse_id(&body.listing_id)?;
    if services
        .listings
        .get(&listing_id)
        .map_err(errors::store_error_to_response)?
        .is_none()
    {
        return Err(errors::not_found());
    }

    let review = Review::new(
        principal.principal_id(),
        listing_id,
        body.rating,
        body.comment,
        Utc::now(),
    )
    .map_err(errors::domain_error_to_response)?;
    services
        .reviews
        .insert(review.id, review.clone())
        .map_err(errors::store_error_to_response)?;

    Ok((StatusCode::CREATED, Json(review)).into_response())
}

pub async fn update_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<ReviewPatch>,
) -> ApiResult {
    let id: ReviewId = errors::parse_id(&id)?;
    let mut review = load(&services, id)?;
    authz::authorize_request(
        &principal,
        Action::MutateOwnEntity,
        &Target::Owned { owner: review.owner() },
    )?;

    review
        .edit(body, Utc::now())
        .map_err(errors::domain_error_to_response)?;
    services
        .reviews
        .replace(&id, review.clone())
        .map_err(errors::store_error_to_response)?;

    Ok(Json(review).into_response())
}

pub async fn delete_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: ReviewId = errors::parse_id(&id)?;
    let review = load(&services, id)?;
    authz::authorize_request(
        &principal,
        Action::MutateOwnEntity,
        &Target::Owned { owner: review.owner() },
    )?;

    services
        .reviews
        .remove(&id)
        .map_err(errors::store_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn load(services: &AppServices, id: ReviewId) -> Result<Review, axum::response::Response> {
    services
        .reviews
        .get(&id)
        .map_err(errors::store_error_to_response)?
        .ok_or_else(errors::not_found)
}
