//! Builder for configuring and starting a watch session.

use std::fmt;
use std::sync::Arc;

use kvw_cache::KvCache;
use kvw_core::{Result, WatchError, WatchQuery, WatchTarget};

use crate::session::WatchSession;
use crate::source::WatchSource;

/// Default capacity of the event channel between source and pump.
pub const DEFAULT_EVENT_BUFFER: usize = 16;

/// Builder for creating a [`WatchSession`].
///
/// The target can be given either as mode and key strings, the way a
/// command line or config file supplies them, or as an already-typed
/// [`WatchTarget`]. A typed target wins when both are present.
///
/// # Example
///
/// ```rust,ignore
/// use kvw_watch::{ScriptedSource, WatchSession};
///
/// let session = WatchSession::builder()
///     .address("127.0.0.1:8500")
///     .mode("key")
///     .key("config/db")
///     .source(ScriptedSource::new().update("config/db", "primary"))
///     .build()?;
/// ```
pub struct WatchSessionBuilder {
    address: Option<String>,
    mode: Option<String>,
    key: Option<String>,
    target: Option<WatchTarget>,
    source: Option<Box<dyn WatchSource>>,
    event_buffer: usize,
    cache_capacity: Option<usize>,
}

impl Default for WatchSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WatchSessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSessionBuilder")
            .field("address", &self.address)
            .field("mode", &self.mode)
            .field("key", &self.key)
            .field("target", &self.target)
            .field("source", &self.source.is_some())
            .field("event_buffer", &self.event_buffer)
            .field("cache_capacity", &self.cache_capacity)
            .finish()
    }
}

impl WatchSessionBuilder {
    /// Create a new session builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            address: None,
            mode: None,
            key: None,
            target: None,
            source: None,
            event_buffer: DEFAULT_EVENT_BUFFER,
            cache_capacity: None,
        }
    }

    /// Set the address of the remote source.
    ///
    /// This is required.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the watch mode, `"key"` or `"keyprefix"`.
    #[must_use]
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Set the key or key prefix to mirror.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set an already-typed target, bypassing mode and key strings.
    #[must_use]
    pub fn target(mut self, target: WatchTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the source that will feed this session.
    ///
    /// This is required.
    #[must_use]
    pub fn source(mut self, source: impl WatchSource) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Set the event channel capacity (default [`DEFAULT_EVENT_BUFFER`]).
    #[must_use]
    pub fn event_buffer(mut self, buffer: usize) -> Self {
        self.event_buffer = buffer.max(1);
        self
    }

    /// Pre-size the mirror for roughly this many keys.
    #[must_use]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Validate the configuration and start the session.
    ///
    /// Must be called from within a tokio runtime; the session spawns
    /// its source and pump tasks on it.
    ///
    /// # Errors
    ///
    /// - [`WatchError::Configuration`] if the source, address, or target
    ///   was never supplied
    /// - [`WatchError::UnsupportedMode`] if the mode string is neither
    ///   `"key"` nor `"keyprefix"`
    /// - [`WatchError::InvalidQuery`] if the address or key is blank
    pub fn build(self) -> Result<WatchSession> {
        let source = self
            .source
            .ok_or_else(|| WatchError::Configuration("watch source is required".into()))?;
        let address = self
            .address
            .ok_or_else(|| WatchError::Configuration("source address is required".into()))?;

        let target = match (self.target, self.mode, self.key) {
            (Some(target), _, _) => target,
            (None, Some(mode), Some(key)) => WatchTarget::parse(&mode, &key)?,
            (None, Some(_), None) => {
                return Err(WatchError::Configuration(
                    "key is required when a mode is given".into(),
                ))
            }
            (None, None, Some(_)) => {
                return Err(WatchError::Configuration(
                    "mode is required when a key is given".into(),
                ))
            }
            (None, None, None) => {
                return Err(WatchError::Configuration(
                    "watch target (mode and key) is required".into(),
                ))
            }
        };

        let query = WatchQuery::new(address, target)?;
        let cache = Arc::new(match self.cache_capacity {
            Some(capacity) => KvCache::with_capacity(capacity),
            None => KvCache::new(),
        });

        Ok(WatchSession::spawn(query, source, cache, self.event_buffer))
    }
}
