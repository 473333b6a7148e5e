//! Watch sessions: wiring a notification source to a mirror.
//!
//! A [`WatchSession`] owns a [`KvCache`](kvw_cache::KvCache) and keeps it
//! current by replaying events from a [`WatchSource`]. Sources push
//! [`WatchEvent`](kvw_core::WatchEvent)s into an [`EventSink`]; a pump
//! task applies them to the cache in order. Sessions are configured and
//! started through the [`WatchSessionBuilder`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod session;
mod source;

pub use builder::{WatchSessionBuilder, DEFAULT_EVENT_BUFFER};
pub use session::WatchSession;
pub use source::{ChannelSource, EventSink, ScriptedSource, WatchSource};
