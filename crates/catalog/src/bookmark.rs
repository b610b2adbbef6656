use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stayhub_auth::PrincipalId;
use stayhub_core::{BookmarkId, Entity, ListingId, Owned};

/// A principal's saved listing. At most one per (owner, listing); the store
/// enforces uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub owner: PrincipalId,
    pub listing_id: ListingId,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(owner: PrincipalId, listing_id: ListingId, now: DateTime<Utc>) -> Self {
        Self {
            id: BookmarkId::new(),
            owner,
            listing_id,
            created_at: now,
        }
    }

    pub fn key(&self) -> (PrincipalId, ListingId) {
        (self.owner, self.listing_id)
    }
}

impl Entity for Bookmark {
    type Id = BookmarkId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for Bookmark {
    type Owner = PrincipalId;

    fn owner(&self) -> PrincipalId {
        self.owner
    }
}
