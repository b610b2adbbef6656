use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use stayhub_core::{AggregateRoot, ExpectedVersion};

use super::StoreError;

/// Store for aggregates with optimistic concurrency.
///
/// A commit only lands if the stored aggregate is still at the version the
/// caller's decision was based on; concurrent writers to one key therefore
/// resolve to exactly one winner.
#[derive(Debug)]
pub struct VersionedStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for VersionedStore<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> VersionedStore<K, V>
where
    K: Clone + Eq + Hash + core::fmt::Debug,
    V: AggregateRoot + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    pub fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if map.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }
        map.insert(key, value);
        Ok(())
    }

    /// Replace the aggregate at `key` if its stored version matches `expected`.
    pub fn commit(&self, key: &K, value: V, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let slot = map.get_mut(key).ok_or(StoreError::NotFound)?;

        let current = slot.version();
        if !expected.matches(current) {
            tracing::debug!(?key, ?expected, current, "rejecting stale commit");
            return Err(StoreError::Concurrency(format!(
                "expected version {}, found {current}",
                expected.get()
            )));
        }

        *slot = value;
        Ok(())
    }

    /// Remove the aggregate at `key` if its stored version matches `expected`.
    pub fn remove(&self, key: &K, expected: ExpectedVersion) -> Result<V, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let current = map.get(key).ok_or(StoreError::NotFound)?.version();
        if !expected.matches(current) {
            tracing::debug!(?key, ?expected, current, "rejecting stale remove");
            return Err(StoreError::Concurrency(format!(
                "expected version {}, found {current}",
                expected.get()
            )));
        }
        map.remove(key).ok_or(StoreError::NotFound)
    }

    pub fn list_where(&self, pred: impl Fn(&V) -> bool) -> Result<Vec<V>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.values().filter(|v| pred(v)).cloned().collect())
    }
}
