use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stayhub_auth::PrincipalId;
use stayhub_core::{DomainError, DomainResult, Entity, ListingId, Owned, ReviewId};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub author: PrincipalId,
    pub listing_id: ListingId,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewPatch {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

fn validate_rating(rating: u8) -> DomainResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(DomainError::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

impl Review {
    pub fn new(
        author: PrincipalId,
        listing_id: ListingId,
        rating: u8,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_rating(rating)?;
        Ok(Self {
            id: ReviewId::new(),
            author,
            listing_id,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn edit(&mut self, patch: ReviewPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(rating) = patch.rating {
            validate_rating(rating)?;
            self.rating = rating;
        }
        if let Some(comment) = patch.comment {
            self.comment = Some(comment);
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Review {
    type Id = ReviewId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for Review {
    type Owner = PrincipalId;

    fn owner(&self) -> PrincipalId {
        self.author
    }
}
