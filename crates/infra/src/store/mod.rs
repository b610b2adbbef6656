mod in_memory;
mod versioned;

pub use in_memory::{InMemoryStore, KeyedStore};
pub use versioned::VersionedStore;

use stayhub_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    Duplicate,

    #[error("concurrency conflict: {0}")]
    Concurrency(String),

    #[error("lock poisoned")]
    Poisoned,
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => DomainError::not_found(),
            StoreError::Duplicate => DomainError::conflict("record already exists"),
            StoreError::Concurrency(msg) => DomainError::conflict(msg),
            StoreError::Poisoned => DomainError::invariant("store lock poisoned"),
        }
    }
}
