use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;

use stayhub_auth::{Action, Target};
use stayhub_catalog::Bookmark;
use stayhub_core::{BookmarkId, ListingId, Owned};
use stayhub_infra::{KeyedStore, StoreError};

use crate::app::dto::CreateBookmarkRequest;
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_bookmarks).post(create_bookmark))
        .route("/:id", delete(delete_bookmark))
}

pub async fn list_bookmarks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    let me = principal.principal_id();
    let mut bookmarks = services
        .bookmarks
        .list_where(&|b| b.owner == me)
        .map_err(errors::store_error_to_response)?;
    bookmarks.sort_by_key(|b| b.created_at);
    Ok(Json(bookmarks).into_response())
}

pub async fn create_bookmark(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateBookmarkRequest>,
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

    let bookmark = Bookmark::new(principal.principal_id(), listing_id, Utc::now());
    match services.bookmarks.insert(bookmark.key(), bookmark.clone()) {
        Ok(()) => Ok((StatusCode::CREATED, Json(bookmark)).into_response()),
        Err(StoreError::Duplicate) => Err(errors::json_error(
            StatusCode::CONFLICT,
            "conflict",
            "listing already bookmarked",
        )),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

pub async fn delete_bookmark(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: BookmarkId = errors::parse_id(&id)?;
    let bookmark = services
        .bookmarks
        .list_where(&|b| b.id == id)
        .map_err(errors::store_error_to_response)?
        .pop()
        .ok_or_else(errors::not_found)?;

    authz::authorize_request(
        &principal,
        Action::MutateOwnEntity,
        &Target::Owned { owner: bookmark.owner() },
    )?;

    services
        .bookmarks
        .remove(&bookmark.key())
        .map_err(errors::store_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
