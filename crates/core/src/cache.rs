//! LRU cache of loaded shoreline fragments.
//!
//! The cache is an ordinary value owned by the caller and passed by `&mut`
//! to whatever needs memoized reads. Entries only leave through eviction or
//! an explicit [`ShorelineCache::invalidate`] / [`ShorelineCache::clear`].

use lru::LruCache;
use std::num::NonZeroUsize;

use crate::geometry::Curve;

/// LRU cache mapping an observation year to its shoreline fragments.
pub struct ShorelineCache {
    inner: LruCache<i32, Vec<Curve>>,
    hits: u64,
    misses: u64,
}

impl ShorelineCache {
    /// Create a new cache holding at most `capacity` years.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(cap),
            hits: 0,
            misses: 0,
        }
    }

    /// Get the cached fragments for a year, if present.
    pub fn get(&mut self, year: i32) -> Option<&Vec<Curve>> {
        match self.inner.get(&year) {
            Some(v) => {
                self.hits += 1;
                Some(v)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert the fragments loaded for a year.
    pub fn insert(&mut self, year: i32, fragments: Vec<Curve>) {
        self.inner.put(year, fragments);
    }

    /// Drop one year, e.g. after its source file was regenerated.
    ///
    /// Returns whether the year was cached.
    pub fn invalidate(&mut self, year: i32) -> bool {
        self.inner.pop(&year).is_some()
    }

    /// Number of years currently cached.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// `(hits, misses)` since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Clear all cached years.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
