//! Notifications emitted by a watch source.

use std::fmt;

/// One key/value entry as reported by the remote namespace.
///
/// # Example
///
/// ```
/// use kvw_core::KvPair;
///
/// let pair = KvPair::new("svc/web", "10.0.0.1:80");
/// assert_eq!(pair.key, "svc/web");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KvPair {
    /// Full key, including any prefix.
    pub key: String,
    /// Value currently stored under the key. May be empty.
    pub value: String,
}

impl KvPair {
    /// Create a pair from anything convertible to strings.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<(String, String)> for KvPair {
    fn from((key, value): (String, String)) -> Self {
        Self { key, value }
    }
}

impl From<(&str, &str)> for KvPair {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}

impl fmt::Display for KvPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// A change notification delivered by a watch source to the mirror.
///
/// Events are applied strictly in the order they are sent; the mirror's
/// state after a sequence of events equals replaying that sequence onto
/// an empty map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A single watched key now has this value.
    Update(KvPair),
    /// The complete current member set under a watched prefix.
    ///
    /// A refresh replaces the mirror contents wholesale; keys missing
    /// from the set are dropped, never merged around.
    Refresh(Vec<KvPair>),
    /// The watched target holds no data at all right now.
    Absent,
}

impl WatchEvent {
    /// Shorthand for an [`WatchEvent::Update`] event.
    #[must_use]
    pub fn update(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Update(KvPair::new(key, value))
    }

    /// Shorthand for a [`WatchEvent::Refresh`] event.
    #[must_use]
    pub fn refresh<I, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<KvPair>,
    {
        Self::Refresh(pairs.into_iter().map(Into::into).collect())
    }
}
