//! The mirror itself: a mutex-guarded map replaying remote notifications.

use std::collections::HashMap;
use std::sync::Mutex;

use kvw_core::KvPair;
use tracing::{debug, trace};

use crate::snapshot::Snapshot;
use crate::stats::CacheStats;

/// A thread-safe local mirror of a watched key/value namespace.
///
/// All mutation goes through `&self`; one mutex guards the whole map.
/// A watched namespace is small and its update rate is bounded by the
/// remote source, so a single lock stays uncontended in practice and
/// keeps every operation trivially atomic.
///
/// Reads either probe one key with [`get`](KvCache::get) or copy the
/// whole state with [`snapshot`](KvCache::snapshot).
///
/// # Example
///
/// ```
/// use kvw_cache::KvCache;
///
/// let cache = KvCache::new();
/// cache.set("svc/web", "10.0.0.1:80");
/// assert_eq!(cache.get("svc/web").as_deref(), Some("10.0.0.1:80"));
/// assert_eq!(cache.get("svc/db"), None);
/// ```
#[derive(Debug)]
pub struct KvCache {
    entries: Mutex<HashMap<String, String>>,
    stats: CacheStats,
}

impl KvCache {
    /// Create an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stats: CacheStats::new(),
        }
    }

    /// Create an empty mirror sized for roughly `capacity` keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::with_capacity(capacity)),
            stats: CacheStats::new(),
        }
    }

    /// Look up the current value for a key.
    ///
    /// Returns `None` when the key is not in the mirror. An empty string
    /// is a real stored value, distinct from an absent key.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = {
            let entries = self.entries.lock().expect("kv lock poisoned");
            entries.get(key).cloned()
        };
        if value.is_some() {
            self.stats.record_hit();
            trace!(key = %key, "kv hit");
        } else {
            self.stats.record_miss();
            trace!(key = %key, "kv miss");
        }
        value
    }

    /// Store a value for a key, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        {
            let mut entries = self.entries.lock().expect("kv lock poisoned");
            entries.insert(key.clone(), value);
        }
        self.stats.record_set();
        debug!(key = %key, "set key");
    }

    /// Drop every entry.
    pub fn flush(&self) {
        {
            let mut entries = self.entries.lock().expect("kv lock poisoned");
            // Assign a fresh map rather than clearing in place, so a large
            // previous state does not pin its capacity.
            *entries = HashMap::new();
        }
        self.stats.record_flush();
        debug!("flushed mirror");
    }

    /// Replace the whole mirror with a new member set.
    ///
    /// Keys absent from `pairs` are dropped. When `pairs` contains a key
    /// twice the last occurrence wins. The swap is atomic: no reader
    /// observes a half-applied set.
    pub fn refresh(&self, pairs: impl IntoIterator<Item = KvPair>) {
        // Materialize outside the lock; the swap itself is O(1).
        let next: HashMap<String, String> = pairs
            .into_iter()
            .map(|pair| (pair.key, pair.value))
            .collect();
        let count = next.len();
        {
            let mut entries = self.entries.lock().expect("kv lock poisoned");
            *entries = next;
        }
        self.stats.record_refresh();
        debug!(keys = count, "refreshed mirror");
    }

    /// Copy the current state into an owned [`Snapshot`].
    ///
    /// The copy is taken under the lock, so it is a single point in time.
    /// Later cache mutation never shows through, in either direction.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let entries = {
            let entries = self.entries.lock().expect("kv lock poisoned");
            entries.clone()
        };
        self.stats.record_snapshot();
        trace!(keys = entries.len(), "copied snapshot");
        Snapshot::from(entries)
    }

    /// Number of keys currently mirrored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("kv lock poisoned").len()
    }

    /// Whether the mirror holds no keys at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("kv lock poisoned").is_empty()
    }

    /// Operation counters for this mirror.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Default for KvCache {
    fn default() -> Self {
        Self::new()
    }
}
