//! Operation counters for a mirror.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing how a [`KvCache`](crate::KvCache) has been used.
///
/// All counters are relaxed atomics; they are cheap to bump from any
/// thread and only ever approximate a consistent cut across each other.
#[derive(Debug, Default)]
pub struct CacheStats {
    sets: AtomicU64,
    flushes: AtomicU64,
    refreshes: AtomicU64,
    snapshots: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one single-key write.
    #[inline]
    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one flush.
    #[inline]
    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one whole-set refresh.
    #[inline]
    pub fn record_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one snapshot copy.
    #[inline]
    pub fn record_snapshot(&self) {
        self.snapshots.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup that found its key.
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup that missed.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of single-key writes.
    #[must_use]
    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::Relaxed)
    }

    /// Number of flushes.
    #[must_use]
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Number of whole-set refreshes.
    #[must_use]
    pub fn refreshes(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Number of snapshot copies.
    #[must_use]
    pub fn snapshots(&self) -> u64 {
        self.snapshots.load(Ordering::Relaxed)
    }

    /// Number of lookups that found their key.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of lookups that missed.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Fraction of lookups that hit, or `0.0` before any lookup.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.sets.store(0, Ordering::Relaxed);
        self.flushes.store(0, Ordering::Relaxed);
        self.refreshes.store(0, Ordering::Relaxed);
        self.snapshots.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
