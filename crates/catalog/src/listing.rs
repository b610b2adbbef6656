use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stayhub_auth::{PrincipalId, Target};
use stayhub_core::{DomainError, DomainResult, Entity, ListingId, ListingKind};

/// A residence or activity offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub kind: ListingKind,
    pub owner: PrincipalId,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    /// Price per night (residence) or per session (activity), in cents.
    pub price: u64,
    pub capacity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when a listing is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    pub price: u64,
    pub capacity: u32,
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingPatch {
    pub title: Option<String>,
    /// A blank string clears the description.
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: Option<u64>,
    pub capacity: Option<u32>,
}

impl Listing {
    pub fn new(
        kind: ListingKind,
        owner: PrincipalId,
        draft: ListingDraft,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let listing = Self {
            id: ListingId::new(),
            kind,
            owner,
            title: draft.title.trim().to_string(),
            description: draft.description.as_deref().and_then(normalize_description),
            location: draft.location.trim().to_string(),
            price: draft.price,
            capacity: draft.capacity,
            created_at: now,
            updated_at: now,
        };
        listing.validate()?;
        Ok(listing)
    }

    /// Apply `patch`, validating the result. `self` is unchanged on error.
    pub fn update(&mut self, patch: ListingPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = normalize_description(&description);
        }
        if let Some(location) = patch.location {
            next.location = location.trim().to_string();
        }
        if let Some(price) = patch.price {
            next.price = price;
        }
        if let Some(capacity) = patch.capacity {
            next.capacity = capacity;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    pub fn target(&self) -> Target {
        Target::Listing { owner: self.owner }
    }

    fn validate(&self) -> DomainResult<()> {
        if self.title.is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        if self.location.is_empty() {
            return Err(DomainError::validation("location must not be empty"));
        }
        if self.price == 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        if self.capacity == 0 {
            return Err(DomainError::validation("capacity must be at least 1"));
        }
        Ok(())
    }
}

fn normalize_description(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Entity for Listing {
    type Id = ListingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ListingDraft {
        ListingDraft {
            title: "  Lakeside cabin ".into(),
            description: None,
            location: "Bled".into(),
            price: 12_000,
            capacity: 4,
        }
    }

    #[test]
    fn new_trims_and_validates() {
        let listing = Listing::new(ListingKind::Residence, PrincipalId::new(), draft(), Utc::now()).unwrap();
        assert_eq!(listing.title, "Lakeside cabin");

        let mut bad = draft();
        bad.price = 0;
        assert!(Listing::new(ListingKind::Residence, PrincipalId::new(), bad, Utc::now()).is_err());
    }

    #[test]
    fn failed_update_leaves_listing_untouched() {
        let mut listing = Listing::new(ListingKind::Activity, PrincipalId::new(), draft(), Utc::now()).unwrap();
        let before = listing.clone();

        let err = listing
            .update(
                ListingPatch {
                    title: Some("   ".into()),
                    price: Some(9_000),
                    ..ListingPatch::default()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(listing, before);

        listing
            .update(ListingPatch { price: Some(9_000), ..ListingPatch::default() }, Utc::now())
            .unwrap();
        assert_eq!(listing.price, 9_000);
    }

    #[test]
    fn blank_description_clears_it() {
        let mut with_description = draft();
        with_description.description = Some(" Quiet, near the lake. ".into());
        let mut listing =
            Listing::new(ListingKind::Residence, PrincipalId::new(), with_description, Utc::now()).unwrap();
        assert_eq!(listing.description.as_deref(), Some("Quiet, near the lake."));

        listing
            .update(ListingPatch { title: Some("Renamed".into()), ..ListingPatch::default() }, Utc::now())
            .unwrap();
        assert_eq!(listing.description.as_deref(), Some("Quiet, near the lake."));

        listing
            .update(ListingPatch { description: Some("   ".into()), ..ListingPatch::default() }, Utc::now())
            .unwrap();
        assert_eq!(listing.description, None);
    }
}
