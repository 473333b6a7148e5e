//! # kvwatch
//!
//! Watched local mirror of a remote key/value namespace.
//!
//! A kvwatch session keeps a thread-safe in-process copy of one slice
//! of a remote key/value store, either a single key or everything under
//! a key prefix, and replays change notifications onto it as they
//! arrive. It supports:
//!
//! - Whole-key watches with per-key update notifications
//! - Key-prefix watches with whole-set refresh notifications
//! - Atomic point-in-time snapshots with diffing
//! - Pluggable notification sources via the `WatchSource` trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kvwatch::prelude::*;
//!
//! // Describe and start a watch
//! let session = WatchSession::builder()
//!     .address("127.0.0.1:8500")
//!     .mode("keyprefix")
//!     .key("svc/")
//!     .source(my_source)
//!     .build()?;
//!
//! // Read through the mirror
//! if let Some(value) = session.get("svc/web") {
//!     println!("svc/web = {value}");
//! }
//!
//! // Or take an atomic copy of the whole slice
//! let snapshot = session.snapshot();
//!
//! // Flush and wind down
//! session.stop();
//! ```
//!
//! ## Architecture
//!
//! This library is organized into several crates:
//!
//! - `kvw-core` - Core types, queries, and error handling
//! - `kvw-cache` - The mirror itself, snapshots, and stats
//! - `kvw-watch` - Sessions, sources, and the event pump
//!
//! This crate (`kvwatch`) re-exports all public APIs for convenience.
//!
//! ## Design Principles
//!
//! 1. **No panics in library code** - All errors are returned as `Result`
//! 2. **Ordered delivery** - Events apply in the exact order they were sent
//! 3. **Atomic reads** - Snapshots are single points in time, never torn
//! 4. **Observable** - Built-in operation counters and tracing support

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Re-export all sub-crates
pub use kvw_cache as cache;
pub use kvw_core as core;
pub use kvw_watch as watch;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use kvwatch::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use kvw_core::{
        KvPair, Result, WatchError, WatchEvent, WatchQuery, WatchResult, WatchTarget,
    };

    // Cache types
    pub use kvw_cache::{CacheStats, KvCache, Snapshot, SnapshotDiff, ValueChange};

    // Watch types
    pub use kvw_watch::{
        ChannelSource, EventSink, ScriptedSource, WatchSession, WatchSessionBuilder, WatchSource,
    };
}

/// Version information for this crate.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Minimum supported Rust version.
    pub const MSRV: &str = "1.75";

    /// Get version info as a string.
    pub fn version_string() -> String {
        format!("kvwatch {} (MSRV {})", VERSION, MSRV)
    }
}
