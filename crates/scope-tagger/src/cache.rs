use crate::types::TagIndex;
use lru::LruCache;
use serde::Serialize;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

#[derive(Debug)]
struct CacheEntry {
    change_counter: u64,
    index: Arc<TagIndex>,
}

/// Counters describing cache behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered without rescanning
    pub hits: u64,
    /// Lookups that found no entry or a stale one
    pub misses: u64,
    /// Full rescans performed
    pub rebuilds: u64,
    /// Entries removed explicitly or pushed out by capacity
    pub evictions: u64,
}

/// Most recent tag index per buffer, invalidated by the host's change counter
///
/// Keyed by the real buffer identity. Equal counters mean the stored index is
/// returned untouched; any other counter triggers a full rescan.
pub struct TagCache<K: Hash + Eq> {
    entries: LruCache<K, CacheEntry>,
    stats: CacheStats,
}

impl<K: Hash + Eq + std::fmt::Debug> TagCache<K> {
    /// Create a cache holding at most `capacity` buffers
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Return the cached index for `buffer_id`, rebuilding it when stale
    pub fn get_or_build<F>(
        &mut self,
        buffer_id: K,
        change_counter: u64,
        build: F,
    ) -> Arc<TagIndex>
    where
        F: FnOnce() -> TagIndex,
    {
        if let Some(entry) = self.entries.get(&buffer_id) {
            if entry.change_counter == change_counter {
                self.stats.hits += 1;
                log::debug!("tag cache hit for buffer {buffer_id:?} (tick {change_counter})");
                return Arc::clone(&entry.index);
            }
        }

        self.stats.misses += 1;
        self.stats.rebuilds += 1;
        log::debug!("tag cache miss for buffer {buffer_id:?} (tick {change_counter}), rescanning");

        let index = Arc::new(build());
        let entry = CacheEntry {
            change_counter,
            index: Arc::clone(&index),
        };

        if let Some((displaced, _)) = self.entries.push(buffer_id, entry) {
            if !self.entries.contains(&displaced) {
                self.stats.evictions += 1;
                log::debug!("tag cache full, dropped buffer {displaced:?}");
            }
        }

        index
    }

    /// Drop cached state for a buffer; unknown ids are ignored
    pub fn evict(&mut self, buffer_id: &K) {
        if self.entries.pop(buffer_id).is_some() {
            self.stats.evictions += 1;
            log::debug!("evicted tags for buffer {buffer_id:?}");
        }
    }

    /// Change counter stored for a buffer, if cached
    pub fn cached_counter(&self, buffer_id: &K) -> Option<u64> {
        self.entries
            .peek(buffer_id)
            .map(|entry| entry.change_counter)
    }

    /// Number of cached buffers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
