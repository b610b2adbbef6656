//! `stayhub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod kind;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::{Entity, Owned};
pub use error::{DomainError, DomainResult};
pub use id::{BookingId, BookmarkId, ListingId, NotificationId, ReviewId};
pub use kind::ListingKind;
