//! Entity traits: identity, and ownership for principal-created records.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity that belongs to exactly one principal.
///
/// Reviews, bookmarks and notifications implement this; the boundary turns
/// `owner()` into the ownership fact an authorization check consumes.
pub trait Owned: Entity {
    type Owner: Copy + Eq + core::fmt::Debug;

    fn owner(&self) -> Self::Owner;
}
