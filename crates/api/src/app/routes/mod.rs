use axum::{Extension, Router, routing::get};

use stayhub_core::ListingKind;

pub mod bookings;
pub mod bookmarks;
pub mod listings;
pub mod notifications;
pub mod reviews;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/user", get(system::whoami))
        .nest(
            "/residences",
            listings::router().layer(Extension(ListingKind::Residence)),
        )
        .nest(
            "/activities",
            listings::router().layer(Extension(ListingKind::Activity)),
        )
        .nest("/bookings", bookings::router())
        .nest("/reviews", reviews::router())
        .nest("/bookmarks", bookmarks::router())
        .nest("/notifications", notifications::router())
}
