//! Thread-safe key/value mirror with point-in-time snapshots.
//!
//! [`KvCache`] holds a local copy of the watched slice of a remote
//! namespace. Writers replay remote notifications onto it; readers
//! either probe single keys or take a [`Snapshot`], an owned copy that
//! is immune to later cache mutation. [`CacheStats`] counts operations
//! for observability.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod snapshot;
mod stats;

pub use cache::KvCache;
pub use snapshot::{Snapshot, SnapshotDiff, ValueChange};
pub use stats::CacheStats;
