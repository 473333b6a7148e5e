//! Error types for watch and mirror operations.

use thiserror::Error;

/// Errors that can occur while describing or running a watch.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The caller asked for a selection mode the mirror does not implement.
    ///
    /// Only whole-key and key-prefix watches are supported; anything else
    /// is rejected up front rather than silently mirroring nothing.
    #[error("unsupported watch mode {mode:?}, expected \"key\" or \"keyprefix\"")]
    UnsupportedMode {
        /// The mode string the caller supplied.
        mode: String,
    },

    /// The watch description was recognized but could not be validated.
    #[error("invalid watch query: {reason}")]
    InvalidQuery {
        /// What was wrong with the query.
        reason: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A required piece of session configuration was never supplied.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The session has stopped and no longer accepts events.
    #[error("watch session is closed")]
    SessionClosed,
}

impl WatchError {
    /// Create a [`WatchError::UnsupportedMode`] from the offending mode string.
    pub fn unsupported_mode(mode: impl Into<String>) -> Self {
        Self::UnsupportedMode { mode: mode.into() }
    }

    /// Create a [`WatchError::InvalidQuery`] from a reason alone.
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a [`WatchError::InvalidQuery`] wrapping an underlying cause.
    pub fn invalid_query_with<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::InvalidQuery {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a [`WatchError::Configuration`] from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether this error indicates caller misuse rather than a runtime fault.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMode { .. } | Self::InvalidQuery { .. } | Self::Configuration(_)
        )
    }
}
