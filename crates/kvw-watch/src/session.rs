//! A running watch session: source task, event pump, and lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kvw_cache::{KvCache, Snapshot};
use kvw_core::{WatchEvent, WatchQuery};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::builder::WatchSessionBuilder;
use crate::source::{EventSink, WatchSource};

/// A live local mirror of one watched slice of a remote namespace.
///
/// A session owns two background tasks: the source, which produces
/// events, and the pump, which applies them to the cache in order.
/// Reads never block on either; they only take the cache lock.
///
/// [`stop`](WatchSession::stop) flushes the mirror and then halts both
/// tasks. Dropping a session without stopping halts the tasks but
/// leaves the last mirrored state in place.
///
/// # Example
///
/// ```rust,ignore
/// use kvw_watch::{ScriptedSource, WatchSession};
///
/// let session = WatchSession::builder()
///     .address("127.0.0.1:8500")
///     .mode("keyprefix")
///     .key("svc/")
///     .source(ScriptedSource::new().update("svc/web", "up"))
///     .build()?;
///
/// let snapshot = session.snapshot();
/// session.stop();
/// ```
#[derive(Debug)]
pub struct WatchSession {
    cache: Arc<KvCache>,
    query: WatchQuery,
    shutdown: watch::Sender<bool>,
    stopped: AtomicBool,
}

impl WatchSession {
    /// Start configuring a new session.
    #[must_use]
    pub fn builder() -> WatchSessionBuilder {
        WatchSessionBuilder::new()
    }

    /// Wire up the channels and spawn the source and pump tasks.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn spawn(
        query: WatchQuery,
        source: Box<dyn WatchSource>,
        cache: Arc<KvCache>,
        event_buffer: usize,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(event_buffer);
        let (shutdown, shutdown_rx) = watch::channel(false);

        let sink = EventSink::new(event_tx);
        let source_query = query.clone();
        tokio::spawn(async move {
            if let Err(error) = source.run(source_query, sink).await {
                warn!(error = %error, "watch source failed");
            }
        });
        tokio::spawn(pump_events(Arc::clone(&cache), event_rx, shutdown_rx));

        info!(query = %query, "watch session started");
        Self {
            cache,
            query,
            shutdown,
            stopped: AtomicBool::new(false),
        }
    }

    /// Shared handle to the mirror this session keeps current.
    ///
    /// Readers may clone the handle and keep using it after the session
    /// is gone; they just stop seeing new updates.
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &Arc<KvCache> {
        &self.cache
    }

    /// Look up the current value for a key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key)
    }

    /// Copy the current mirror state into an owned [`Snapshot`].
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.cache.snapshot()
    }

    /// The query this session was built from.
    #[inline]
    #[must_use]
    pub fn query(&self) -> &WatchQuery {
        &self.query
    }

    /// Whether [`stop`](WatchSession::stop) has run.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Flush the mirror, then halt the source and pump.
    ///
    /// The flush comes first so a caller reading right after `stop`
    /// sees an empty mirror. An event already in flight inside the pump
    /// may still land after the flush; anything beyond that is cut off.
    /// Calling `stop` again does nothing.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cache.flush();
        let _ = self.shutdown.send(true);
        info!(query = %self.query, "watch session stopped");
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        // Halt the tasks, but keep whatever state was mirrored.
        if !self.stopped.load(Ordering::SeqCst) {
            let _ = self.shutdown.send(true);
        }
    }
}

/// Apply events to the cache until shutdown or until the source ends.
async fn pump_events(
    cache: Arc<KvCache>,
    mut events: mpsc::Receiver<WatchEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            // Shutdown wins when both branches are ready.
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            event = events.recv() => {
                match event {
                    Some(WatchEvent::Update(pair)) => cache.set(pair.key, pair.value),
                    Some(WatchEvent::Refresh(pairs)) => cache.refresh(pairs),
                    Some(WatchEvent::Absent) => cache.flush(),
                    None => {
                        debug!("event channel ended");
                        break;
                    }
                }
            }
        }
    }
    debug!("event pump exited");
}
