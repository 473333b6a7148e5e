//! Core types and error handling for the kvwatch mirror.
//!
//! This crate defines the vocabulary shared by the rest of the workspace:
//! the [`WatchError`] taxonomy, the [`WatchEvent`] notifications a source
//! emits, and the [`WatchQuery`] that describes which slice of a remote
//! key/value namespace a mirror tracks.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod event;
mod query;

pub use error::WatchError;
pub use event::{KvPair, WatchEvent};
pub use query::{WatchQuery, WatchTarget};

/// Convenience result alias for watch operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result alias with the error type spelled out, for call sites that
/// already have a `Result` in scope.
pub type WatchResult<T> = Result<T>;
