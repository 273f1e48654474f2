use std::hash::Hash;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// A cached value and the moment it was fetched upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: DateTime<Utc>,
}

/// Key/value storage behind a [`TtlCache`](super::TtlCache).
///
/// Implementations must be safe for concurrent reads and inserts. Two writers
/// racing on the same key may both win; the cache tolerates that.
pub trait CacheStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<CacheEntry<V>>;
    fn put(&self, key: K, entry: CacheEntry<V>);
    fn remove(&self, key: &K);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store backed by a sharded concurrent map.
#[derive(Debug)]
pub struct InMemoryCacheStore<K: Eq + Hash, V> {
    entries: DashMap<K, CacheEntry<V>>,
}

impl<K: Eq + Hash, V> InMemoryCacheStore<K, V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> Default for InMemoryCacheStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheStore<K, V> for InMemoryCacheStore<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<CacheEntry<V>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: K, entry: CacheEntry<V>) {
        self.entries.insert(key, entry);
    }

    fn remove(&self, key: &K) {
        self.entries.remove(key);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
