//! Keyed composition store with LRU eviction.
//!
//! The cache is a plain injected service: the host owns one (usually inside
//! a [`crate::loader::CompositionLoader`]) and decides its lifetime. Parsed
//! compositions are immutable, so entries are shared out as [`Arc`]s and one
//! cached document can back any number of players.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::debug;

use crate::composition::model::Composition;

/// Default entry capacity when the host does not specify one.
pub const DEFAULT_CACHE_CAPACITY: usize = 20;

/// LRU cache of parsed compositions by document key.
#[derive(Debug)]
pub struct CompositionCache {
    entries: LruCache<String, Arc<Composition>>,
}

impl CompositionCache {
    /// A cache holding at most `capacity` compositions.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Look up a composition, marking it most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<Arc<Composition>> {
        let hit = self.entries.get(key).cloned();
        debug!(key, hit = hit.is_some(), "composition cache lookup");
        hit
    }

    /// Store a composition, evicting the least recently used entry when
    /// full.
    pub fn put(&mut self, key: impl Into<String>, composition: Arc<Composition>) {
        let key = key.into();
        debug!(%key, "composition cached");
        self.entries.put(key, composition);
    }

    /// Change the capacity, evicting least recently used entries as needed.
    pub fn resize(&mut self, capacity: NonZeroUsize) {
        self.entries.resize(capacity);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached compositions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current entry capacity.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for CompositionCache {
    fn default() -> Self {
        // Capacity is a compile-time non-zero constant.
        Self::new(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

#[cfg(test)]
#[path = "../tests/unit/cache.rs"]
mod tests;
