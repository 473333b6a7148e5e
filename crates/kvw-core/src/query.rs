//! Watch queries: which slice of the remote namespace a mirror tracks.

use std::fmt;

use crate::{Result, WatchError};

/// Selection mode and pattern for the watched slice of the namespace.
///
/// A target is either a single whole key or everything under a key
/// prefix. The two modes have different refresh semantics: a key watch
/// receives per-key updates, a prefix watch receives whole member sets.
///
/// # Example
///
/// ```
/// use kvw_core::WatchTarget;
///
/// let target = WatchTarget::parse("keyprefix", "svc/")?;
/// assert!(target.matches("svc/web"));
/// assert!(!target.matches("jobs/web"));
/// # Ok::<(), kvw_core::WatchError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WatchTarget {
    /// Mirror exactly one key.
    Key(String),
    /// Mirror every key under a prefix.
    Prefix(String),
}

impl WatchTarget {
    /// Mode string selecting a whole-key watch.
    pub const MODE_KEY: &'static str = "key";

    /// Mode string selecting a key-prefix watch.
    pub const MODE_PREFIX: &'static str = "keyprefix";

    /// Build a whole-key target.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidQuery`] if the key is empty or blank.
    pub fn key(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(WatchError::invalid_query("key must not be empty"));
        }
        Ok(Self::Key(key))
    }

    /// Build a key-prefix target.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidQuery`] if the prefix is empty or blank.
    pub fn prefix(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.trim().is_empty() {
            return Err(WatchError::invalid_query("key prefix must not be empty"));
        }
        Ok(Self::Prefix(prefix))
    }

    /// Build a target from a textual mode and its pattern.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::UnsupportedMode`] for any mode other than
    /// `"key"` or `"keyprefix"`, and [`WatchError::InvalidQuery`] if the
    /// pattern fails validation for a supported mode.
    pub fn parse(mode: &str, pattern: &str) -> Result<Self> {
        match mode {
            Self::MODE_KEY => Self::key(pattern),
            Self::MODE_PREFIX => Self::prefix(pattern),
            other => Err(WatchError::unsupported_mode(other)),
        }
    }

    /// The textual mode for this target.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Key(_) => Self::MODE_KEY,
            Self::Prefix(_) => Self::MODE_PREFIX,
        }
    }

    /// The key or prefix pattern this target selects.
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::Key(key) => key,
            Self::Prefix(prefix) => prefix,
        }
    }

    /// Whether the given key falls inside this target.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Key(exact) => key == exact,
            Self::Prefix(prefix) => key.starts_with(prefix.as_str()),
        }
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mode(), self.pattern())
    }
}

/// A validated description of one watch: where to connect and what to track.
///
/// # Example
///
/// ```
/// use kvw_core::{WatchQuery, WatchTarget};
///
/// let target = WatchTarget::key("config/db")?;
/// let query = WatchQuery::new("127.0.0.1:8500", target)?;
/// assert_eq!(query.address(), "127.0.0.1:8500");
/// # Ok::<(), kvw_core::WatchError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchQuery {
    address: String,
    target: WatchTarget,
}

impl WatchQuery {
    /// Build a query from a source address and a target.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidQuery`] if the address is empty or blank.
    pub fn new(address: impl Into<String>, target: WatchTarget) -> Result<Self> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(WatchError::invalid_query("source address must not be empty"));
        }
        Ok(Self { address, target })
    }

    /// Address of the remote source this watch connects to.
    #[inline]
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The slice of the namespace this watch tracks.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    /// Split the query back into its parts.
    #[must_use]
    pub fn into_parts(self) -> (String, WatchTarget) {
        (self.address, self.target)
    }
}

impl fmt::Display for WatchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.target, self.address)
    }
}
