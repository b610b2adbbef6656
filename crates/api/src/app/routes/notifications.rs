use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;

use stayhub_auth::{Action, Target};
use stayhub_core::{NotificationId, Owned};
use stayhub_infra::KeyedStore;
use stayhub_notifications::Notification;

use crate::app::dto::NotificationListQuery;
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/mark-all-as-read", post(mark_all_as_read))
        .route("/:id/mark-as-read", post(mark_as_read))
        .route("/:id", delete(delete_notification))
}

pub async fn list_notifications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<NotificationListQuery>,
) -> ApiResult {
    let me = principal.principal_id();
    let mut notifications = services
        .notifications
        .list_where(&|n| n.recipient == me && !(query.unread_only && n.is_read()))
        .map_err(errors::store_error_to_response)?;
    notifications.sort_by_key(|n| core::cmp::Reverse(n.created_at));
    Ok(Json(notifications).into_response())
}

pub async fn mark_all_as_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    let me = principal.principal_id();
    let now = Utc::now();
    let marked = services
        .notifications
        .update_where(&|n| n.recipient == me, &mut |n| usize::from(n.mark_read(now)))
        .map_err(errors::store_error_to_response)?;

    Ok(Json(serde_json::json!({ "marked": marked })).into_response())
}

pub async fn mark_as_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: NotificationId = errors::parse_id(&id)?;
    let mut notification = load_owned(&services, &principal, id)?;

    if notification.mark_read(Utc::now()) {
        services
            .notifications
            .replace(&id, notification.clone())
            .map_err(errors::store_error_to_response)?;
    }
    Ok(Json(notification).into_response())
}

pub async fn delete_notification(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: NotificationId = errors::parse_id(&id)?;
    load_owned(&services, &principal, id)?;

    services
        .notifications
        .remove(&id)
        .map_err(errors::store_error_to_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn load_owned(
    services: &AppServices,
    principal: &PrincipalContext,
    id: NotificationId,
) -> Result<Notification, axum::response::Response> {
    let notification = services
        .notifications
        .get(&id)
        .map_err(errors::store_error_to_response)?
        .ok_or_else(errors::not_found)?;

    authz::authorize_request(
        principal,
        Action::MutateOwnEntity,
        &Target::Owned { owner: notification.owner() },
    )?;
    Ok(notification)
}
