//! Document loading: worker-thread parsing with per-key coalescing, cached
//! results, and cancellable ready-listeners.
//!
//! Fetching bytes from network or disk stays with the embedder; the loader
//! takes document text it was already handed. What it owns is the contract
//! around parsing: at most one in-flight parse per key, every concurrent
//! request for that key fanned the one result exactly once, and a listener
//! that was cancelled before completion is never called — without aborting
//! the shared parse for the other waiters.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;

use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::cache::CompositionCache;
use crate::composition::model::Composition;
use crate::foundation::error::{AnimyteError, AnimyteResult};

/// Outcome delivered to load listeners. Errors are shared because one parse
/// failure fans out to every waiter.
pub type LoadResult = Result<Arc<Composition>, Arc<AnimyteError>>;

/// Called exactly once with the parse outcome, unless cancelled first.
pub type LoadListener = Box<dyn FnOnce(LoadResult) + Send>;

struct Inflight {
    listeners: Vec<(u64, LoadListener)>,
}

type InflightMap = Mutex<HashMap<String, Inflight>>;

/// Parses documents into compositions, caching by key and coalescing
/// concurrent requests.
pub struct CompositionLoader {
    cache: Mutex<CompositionCache>,
    inflight: Arc<InflightMap>,
    next_listener: AtomicU64,
}

impl CompositionLoader {
    /// A loader with a composition cache of the given capacity.
    pub fn new(cache_capacity: NonZeroUsize) -> Self {
        Self {
            cache: Mutex::new(CompositionCache::new(cache_capacity)),
            inflight: Arc::new(Mutex::new(HashMap::new())),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Derive a cache key from document content (xxh3 of the bytes), for
    /// callers without a natural resource id.
    pub fn content_key(json: &str) -> String {
        format!("{:016x}", xxh3_64(json.as_bytes()))
    }

    /// Cached composition for `key`, if present.
    pub fn cached(&self, key: &str) -> Option<Arc<Composition>> {
        self.lock_cache().get(key)
    }

    /// Parse synchronously, consulting the cache first. `key` defaults to
    /// the content hash when the caller has no resource id.
    pub fn load_json(&self, key: Option<&str>, json: &str) -> AnimyteResult<Arc<Composition>> {
        let key = match key {
            Some(key) => key.to_owned(),
            None => Self::content_key(json),
        };
        if let Some(hit) = self.lock_cache().get(&key) {
            return Ok(hit);
        }
        let composition = Arc::new(Composition::from_json(json)?);
        self.lock_cache().put(key, Arc::clone(&composition));
        Ok(composition)
    }

    /// Parse on a worker thread, delivering the outcome to `listener`.
    ///
    /// Requests for a key that is already being parsed coalesce: the
    /// listener joins the in-flight parse's waiter list instead of starting
    /// a second parse. Cache hits deliver synchronously before returning.
    /// The returned handle cancels delivery to this listener only.
    pub fn load_in_background(
        self: &Arc<Self>,
        key: impl Into<String>,
        json: String,
        listener: LoadListener,
    ) -> ListenerHandle {
        let key = key.into();
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);

        if let Some(hit) = self.lock_cache().get(&key) {
            listener(Ok(hit));
            return ListenerHandle {
                key,
                id,
                inflight: Weak::new(),
            };
        }

        let spawn = {
            let mut inflight = self.lock_inflight();
            match inflight.get_mut(&key) {
                Some(entry) => {
                    debug!(%key, "coalescing into in-flight parse");
                    entry.listeners.push((id, listener));
                    false
                }
                None => {
                    inflight.insert(
                        key.clone(),
                        Inflight {
                            listeners: vec![(id, listener)],
                        },
                    );
                    true
                }
            }
        };

        if spawn {
            let loader = Arc::clone(self);
            let task_key = key.clone();
            let worker_json = json.clone();
            let builder = thread::Builder::new().name("animyte-parse".into());
            let spawned = builder.spawn(move || loader.run_parse(&task_key, &worker_json));
            if let Err(error) = spawned {
                warn!(%error, "parse worker failed to spawn; parsing inline");
                self.run_parse(&key, &json);
            }
        }

        ListenerHandle {
            key,
            id,
            inflight: Arc::downgrade(&self.inflight),
        }
    }

    /// Change the cache capacity.
    pub fn resize_cache(&self, capacity: NonZeroUsize) {
        self.lock_cache().resize(capacity);
    }

    /// Drop every cached composition.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn run_parse(&self, key: &str, json: &str) {
        let result: LoadResult = match Composition::from_json(json) {
            Ok(composition) => {
                let composition = Arc::new(composition);
                self.lock_cache().put(key, Arc::clone(&composition));
                Ok(composition)
            }
            Err(error) => {
                warn!(%key, %error, "document parse failed");
                Err(Arc::new(error))
            }
        };
        let waiters = self
            .lock_inflight()
            .remove(key)
            .map(|entry| entry.listeners)
            .unwrap_or_default();
        for (_, listener) in waiters {
            listener(result.clone());
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, CompositionCache> {
        // A poisoned lock means a panic mid-put; the cache holds only
        // immutable Arcs, so continuing with it is sound.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_inflight(&self) -> std::sync::MutexGuard<'_, HashMap<String, Inflight>> {
        self.inflight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for CompositionLoader {
    /// A loader with the default cache capacity.
    fn default() -> Self {
        Self {
            cache: Mutex::new(CompositionCache::default()),
            inflight: Arc::new(Mutex::new(HashMap::new())),
            next_listener: AtomicU64::new(1),
        }
    }
}

impl std::fmt::Debug for CompositionLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionLoader")
            .field("cached", &self.lock_cache().len())
            .field("inflight", &self.lock_inflight().len())
            .finish()
    }
}

/// Handle to one registered load listener.
#[derive(Debug)]
pub struct ListenerHandle {
    key: String,
    id: u64,
    inflight: Weak<InflightMap>,
}

impl ListenerHandle {
    /// Prevent delivery to this listener. The shared parse keeps running for
    /// any other waiters; cancelling after delivery is a no-op.
    pub fn cancel(self) {
        let Some(inflight) = self.inflight.upgrade() else {
            return;
        };
        let mut inflight = inflight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = inflight.get_mut(&self.key) {
            entry.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/loader.rs"]
mod tests;
