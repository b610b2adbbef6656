//! `stayhub-api`: HTTP boundary for the marketplace.
//!
//! Resolves the bearer-token principal, runs the pure policy checks and maps
//! their decisions to client-visible responses.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
