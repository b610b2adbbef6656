//! Policy checks at the HTTP boundary.
//!
//! Thin wrappers over `stayhub_auth` that log denials and turn them into
//! ready-to-send responses.

use axum::response::Response;

use stayhub_auth::{Action, Decision, Target, authorize, screen};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Role gate, run before any lookup.
pub fn screen_request(principal: &PrincipalContext, action: Action) -> Result<(), Response> {
    check(principal, action, screen(principal.principal(), action))
}

pub fn authorize_request(
    principal: &PrincipalContext,
    action: Action,
    target: &Target,
) -> Result<(), Response> {
    check(principal, action, authorize(principal.principal(), action, target))
}

fn check(principal: &PrincipalContext, action: Action, decision: Decision) -> Result<(), Response> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::info!(
                principal = %principal.principal_id(),
                role = %principal.role(),
                %action,
                reason = reason.as_str(),
                "request denied"
            );
            Err(errors::deny_to_response(reason))
        }
    }
}
