//! Result caching keyed by input content identity
//!
//! Memoizes the `(original, cutout)` pair computed for each distinct upload so
//! byte-identical resubmissions skip the expensive removal call. Keys are
//! SHA-256 digests of the raw bytes, so the cache never retains the uploads
//! themselves, and capacity is bounded with least-recently-used eviction.

use crate::types::ImagePair;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Content identity of an upload: the SHA-256 digest of its bytes
pub type ContentKey = [u8; 32];

/// Runtime statistics for the result cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries currently cached
    pub entries: usize,
    /// Lookups that found an entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
}

/// Bounded, thread-safe cache of computed image pairs
///
/// Entries are immutable `Arc`s keyed uniquely by input content, so the lock
/// is held only for the lookup or insert itself; concurrent requests for
/// distinct keys serialize briefly and never observe partial entries.
pub struct ResultCache {
    entries: Mutex<LruCache<ContentKey, Arc<ImagePair>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` entries
    ///
    /// A zero capacity is clamped to one entry; configuration validation
    /// rejects zero before it reaches this point.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Compute the content key for an upload
    #[must_use]
    pub fn content_key(bytes: &[u8]) -> ContentKey {
        Sha256::digest(bytes).into()
    }

    /// Look up a previously computed pair, marking it most recently used
    pub fn get(&self, key: &ContentKey) -> Option<Arc<ImagePair>> {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match entries.get(key) {
            Some(pair) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(pair))
            },
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            },
        }
    }

    /// Record a computed pair, evicting the least-recently-used entry at capacity
    pub fn insert(&self, key: ContentKey, pair: Arc<ImagePair>) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.put(key, pair);
    }

    /// Number of entries currently cached
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries before eviction
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .cap()
            .get()
    }

    /// Drop all entries, keeping hit/miss counters
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    /// Snapshot of the cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("ResultCache")
            .field("entries", &stats.entries)
            .field("capacity", &self.capacity())
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}
