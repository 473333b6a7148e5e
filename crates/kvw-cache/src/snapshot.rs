//! Owned, point-in-time copies of the mirror.

use std::collections::hash_map;
use std::collections::HashMap;

use kvw_core::KvPair;

/// An owned copy of the mirror taken at a single point in time.
///
/// A snapshot never changes after it is taken. Two snapshots compare
/// equal exactly when they hold the same keys with the same values,
/// which makes polling loops cheap to write: take a snapshot, compare
/// with the previous one, [`diff`](Snapshot::diff) when they differ.
///
/// # Example
///
/// ```
/// use kvw_cache::Snapshot;
///
/// let snap: Snapshot = [("svc/web", "up"), ("svc/db", "up")]
///     .into_iter()
///     .collect();
/// assert_eq!(snap.get("svc/web"), Some("up"));
/// assert_eq!(snap.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: HashMap<String, String>,
}

impl Snapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `key` at the time the snapshot was taken.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether `key` was present when the snapshot was taken.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys in the snapshot.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot holds no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Iterate over the keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Consume the snapshot, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> HashMap<String, String> {
        self.entries
    }

    /// Compare this snapshot with a newer one.
    ///
    /// Reports keys only in `newer` as added, keys only in `self` as
    /// removed, and keys in both with differing values as changed. Each
    /// list is sorted by key so output is deterministic.
    #[must_use]
    pub fn diff(&self, newer: &Snapshot) -> SnapshotDiff {
        let mut added = Vec::new();
        let mut removed = Vec::new();
        let mut changed = Vec::new();

        for (key, value) in &self.entries {
            match newer.entries.get(key) {
                None => removed.push(KvPair::new(key.as_str(), value.as_str())),
                Some(next) if next != value => changed.push(ValueChange {
                    key: key.clone(),
                    from: value.clone(),
                    to: next.clone(),
                }),
                Some(_) => {}
            }
        }
        for (key, value) in &newer.entries {
            if !self.entries.contains_key(key) {
                added.push(KvPair::new(key.as_str(), value.as_str()));
            }
        }

        added.sort_by(|a, b| a.key.cmp(&b.key));
        removed.sort_by(|a, b| a.key.cmp(&b.key));
        changed.sort_by(|a, b| a.key.cmp(&b.key));

        SnapshotDiff {
            added,
            removed,
            changed,
        }
    }
}

impl From<HashMap<String, String>> for Snapshot {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, String)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl FromIterator<KvPair> for Snapshot {
    fn from_iter<I: IntoIterator<Item = KvPair>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|pair| (pair.key, pair.value))
                .collect(),
        }
    }
}

impl IntoIterator for Snapshot {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// The difference between two snapshots, keyed to the newer one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    added: Vec<KvPair>,
    removed: Vec<KvPair>,
    changed: Vec<ValueChange>,
}

impl SnapshotDiff {
    /// Keys present only in the newer snapshot, sorted by key.
    #[must_use]
    pub fn added(&self) -> &[KvPair] {
        &self.added
    }

    /// Keys present only in the older snapshot, sorted by key.
    #[must_use]
    pub fn removed(&self) -> &[KvPair] {
        &self.removed
    }

    /// Keys present in both snapshots with differing values, sorted by key.
    #[must_use]
    pub fn changed(&self) -> &[ValueChange] {
        &self.changed
    }

    /// Whether the two snapshots were identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// One key whose value differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChange {
    /// The key in question.
    pub key: String,
    /// Value in the older snapshot.
    pub from: String,
    /// Value in the newer snapshot.
    pub to: String,
}
