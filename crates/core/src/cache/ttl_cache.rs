use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Duration;

use super::cache_store::{CacheEntry, CacheStore};
use super::clock::Clock;

/// A cache hit, fresh or not.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup<V> {
    pub value: V,
    pub age: Duration,
    pub is_fresh: bool,
}

/// Time-bounded cache over an injectable store and clock.
pub struct TtlCache<K, V> {
    store: Arc<dyn CacheStore<K, V>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    _key: PhantomData<fn(K) -> V>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            ttl: self.ttl,
            _key: PhantomData,
        }
    }
}

impl<K, V> TtlCache<K, V> {
    pub fn new(store: Arc<dyn CacheStore<K, V>>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            _key: PhantomData,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Entry for `key` if one exists, however old.
    pub fn get_any(&self, key: &K) -> Option<CacheLookup<V>> {
        let entry = self.store.get(key)?;
        let age = self.clock.now() - entry.fetched_at;
        Some(CacheLookup {
            value: entry.value,
            age,
            is_fresh: age < self.ttl,
        })
    }

    /// Entry for `key` only while it is younger than the TTL.
    pub fn get_fresh(&self, key: &K) -> Option<V> {
        self.get_any(key)
            .filter(|lookup| lookup.is_fresh)
            .map(|lookup| lookup.value)
    }

    /// Store `value` as fetched now.
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            fetched_at: self.clock.now(),
        };
        self.store.put(key, entry);
    }

    pub fn invalidate(&self, key: &K) {
        self.store.remove(key);
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
