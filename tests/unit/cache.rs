use super::*;

use std::collections::HashMap;

use crate::foundation::core::{Canvas, FrameRange};

fn composition() -> Arc<Composition> {
    Arc::new(Composition {
        name: None,
        version: None,
        canvas: Canvas::new(100, 100),
        range: FrameRange::new(0.0, 60.0).unwrap(),
        frame_rate: 30.0,
        layers: Vec::new(),
        assets: HashMap::new(),
        markers: Vec::new(),
        fonts: HashMap::new(),
        characters: HashMap::new(),
        warnings: Vec::new(),
    })
}

fn cache_of(capacity: usize) -> CompositionCache {
    CompositionCache::new(NonZeroUsize::new(capacity).unwrap())
}

#[test]
fn hits_return_the_shared_composition() {
    let mut cache = cache_of(4);
    let comp = composition();
    cache.put("doc", Arc::clone(&comp));

    let hit = cache.get("doc").unwrap();
    assert!(Arc::ptr_eq(&hit, &comp));
    assert!(cache.get("other").is_none());
}

#[test]
fn the_least_recently_used_entry_is_evicted() {
    let mut cache = cache_of(2);
    cache.put("a", composition());
    cache.put("b", composition());

    // Touching "a" makes "b" the eviction candidate.
    cache.get("a");
    cache.put("c", composition());

    assert!(cache.get("a").is_some());
    assert!(cache.get("b").is_none());
    assert!(cache.get("c").is_some());
    assert_eq!(cache.len(), 2);
}

#[test]
fn resizing_down_evicts_to_the_new_capacity() {
    let mut cache = cache_of(3);
    cache.put("a", composition());
    cache.put("b", composition());
    cache.put("c", composition());

    cache.resize(NonZeroUsize::new(1).unwrap());
    assert_eq!(cache.capacity(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.get("c").is_some());
}

#[test]
fn clear_empties_the_cache() {
    let mut cache = cache_of(2);
    cache.put("a", composition());
    assert!(!cache.is_empty());

    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.get("a").is_none());
}

#[test]
fn the_default_cache_uses_the_default_capacity() {
    let cache = CompositionCache::default();
    assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
}
