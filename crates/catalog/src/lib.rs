//! Listings (residences and activities) and the records guests attach to
//! them: reviews and bookmarks.

pub mod bookmark;
pub mod listing;
pub mod review;

pub use bookmark::Bookmark;
pub use listing::{Listing, ListingDraft, ListingPatch};
pub use review::{Review, ReviewPatch};
