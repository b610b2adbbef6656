use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stayhub_auth::DenyReason;
use stayhub_bookings::{BookingError, Rejection};
use stayhub_core::DomainError;
use stayhub_infra::StoreError;

pub type ApiResult = Result<axum::response::Response, axum::response::Response>;

pub fn deny_to_response(reason: DenyReason) -> axum::response::Response {
    let message = match reason {
        DenyReason::InsufficientRole => "this action requires the provider role",
        DenyReason::NotOwner => "you do not own this record",
    };
    json_error(StatusCode::FORBIDDEN, reason.as_str(), message)
}

pub fn rejection_to_response(rejection: Rejection) -> axum::response::Response {
    match rejection {
        Rejection::InvalidTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_transition", rejection.to_string())
        }
        Rejection::NotAuthorized(_) => {
            json_error(StatusCode::FORBIDDEN, "not_authorized", rejection.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
    }
}

pub fn booking_error_to_response(err: BookingError) -> axum::response::Response {
    match err {
        BookingError::Rejected(r) => rejection_to_response(r),
        BookingError::Forbidden(e) => deny_to_response(e.reason),
        BookingError::Domain(e) => domain_error_to_response(e),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    if let StoreError::Poisoned = err {
        tracing::error!("store lock poisoned");
    }
    domain_error_to_response(err.into())
}

pub fn not_found() -> axum::response::Response {
    domain_error_to_response(DomainError::not_found())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path/body identifier, answering 400 on failure.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr<Err = DomainError>,
{
    raw.parse().map_err(domain_error_to_response)
}
