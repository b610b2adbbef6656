//! `stayhub-auth`: pure authorization boundary.
//!
//! Decides whether a principal may perform an action on a target, given the
//! ownership facts the caller has already looked up. This crate is decoupled
//! from HTTP and storage; token decoding lives in [`jwt`] so the boundary can
//! turn a bearer token into a [`Principal`].

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, Decision, DenyReason, Target, authorize, screen};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use permissions::Action;
pub use principal::{Principal, PrincipalId};
pub use roles::Role;
