use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use super::StoreError;

/// Key/value store abstraction for marketplace records.
pub trait KeyedStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Result<Option<V>, StoreError>;

    /// Insert a new record; fails with `Duplicate` if the key is taken.
    fn insert(&self, key: K, value: V) -> Result<(), StoreError>;

    /// Overwrite an existing record; fails with `NotFound` if absent.
    fn replace(&self, key: &K, value: V) -> Result<(), StoreError>;

    fn remove(&self, key: &K) -> Result<V, StoreError>;

    /// All records matching `pred`.
    fn list_where(&self, pred: &dyn Fn(&V) -> bool) -> Result<Vec<V>, StoreError>;

    /// Mutate every record matching `pred` under a single write lock; returns
    /// the sum of what `f` reports.
    fn update_where(
        &self,
        pred: &dyn Fn(&V) -> bool,
        f: &mut dyn FnMut(&mut V) -> usize,
    ) -> Result<usize, StoreError>;
}

/// In-memory store for tests/dev.
#[derive(Debug)]
pub struct InMemoryStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> KeyedStore<K, V> for InMemoryStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if map.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }
        map.insert(key, value);
        Ok(())
    }

    fn replace(&self, key: &K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let slot = map.get_mut(key).ok_or(StoreError::NotFound)?;
        *slot = value;
        Ok(())
    }

    fn remove(&self, key: &K) -> Result<V, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        map.remove(key).ok_or(StoreError::NotFound)
    }

    fn list_where(&self, pred: &dyn Fn(&V) -> bool) -> Result<Vec<V>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.values().filter(|v| pred(v)).cloned().collect())
    }

    fn update_where(
        &self,
        pred: &dyn Fn(&V) -> bool,
        f: &mut dyn FnMut(&mut V) -> usize,
    ) -> Result<usize, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        Ok(map.values_mut().filter(|v| pred(v)).map(|v| f(v)).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_duplicate_keys() {
        let store: InMemoryStore<u32, &'static str> = InMemoryStore::new();
        store.insert(1, "a").unwrap();
        assert_eq!(store.insert(1, "b"), Err(StoreError::Duplicate));
        assert_eq!(store.get(&1).unwrap(), Some("a"));
    }

    #[test]
    fn replace_and_remove_require_existing_key() {
        let store: InMemoryStore<u32, u32> = InMemoryStore::new();
        assert_eq!(store.replace(&7, 1), Err(StoreError::NotFound));
        assert_eq!(store.remove(&7), Err(StoreError::NotFound));

        store.insert(7, 1).unwrap();
        store.replace(&7, 2).unwrap();
        assert_eq!(store.remove(&7), Ok(2));
    }

    #[test]
    fn update_where_touches_matching_records_only() {
        let store: InMemoryStore<u32, u32> = InMemoryStore::new();
        for k in 0..5 {
            store.insert(k, k).unwrap();
        }

        let touched = store
            .update_where(&|v| v % 2 == 0, &mut |v| {
                *v += 100;
                1
            })
            .unwrap();
        assert_eq!(touched, 3);

        let mut evens = store.list_where(&|v| *v >= 100).unwrap();
        evens.sort();
        assert_eq!(evens, vec![100, 102, 104]);
    }
}
