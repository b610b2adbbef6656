//! Infrastructure layer: storage adapters.
//!
//! Only in-memory stores exist today; they back the API in dev and tests.

pub mod store;

pub use store::{InMemoryStore, KeyedStore, StoreError, VersionedStore};
