//! Notification sources and the sink they deliver into.

use std::time::Duration;

use async_trait::async_trait;
use kvw_core::{KvPair, Result, WatchError, WatchEvent, WatchQuery};
use tokio::sync::mpsc;
use tracing::debug;

/// Write end of a session's event channel.
///
/// A sink preserves order: events arrive at the mirror exactly as they
/// were sent. When the channel is full, [`send`](EventSink::send) waits
/// for the pump to catch up; a full channel backpressures the source,
/// it never drops or reorders.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<WatchEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::Sender<WatchEvent>) -> Self {
        Self { tx }
    }

    /// Deliver one event to the session.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionClosed`] once the session has stopped
    /// listening; a source should treat that as its cue to wind down.
    pub async fn send(&self, event: WatchEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| WatchError::SessionClosed)
    }

    /// Deliver a single-key update.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionClosed`] once the session has stopped.
    pub async fn update(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.send(WatchEvent::update(key, value)).await
    }

    /// Deliver a whole-set refresh.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionClosed`] once the session has stopped.
    pub async fn refresh(&self, pairs: impl IntoIterator<Item = KvPair>) -> Result<()> {
        self.send(WatchEvent::Refresh(pairs.into_iter().collect()))
            .await
    }

    /// Report that the watched target currently holds no data.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::SessionClosed`] once the session has stopped.
    pub async fn absent(&self) -> Result<()> {
        self.send(WatchEvent::Absent).await
    }

    /// Whether the session has stopped listening.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A driver that produces change notifications for one watch.
///
/// An implementation connects to whatever the remote side is (or fakes
/// one, like [`ScriptedSource`]) and pushes events into the sink until
/// either the remote side ends or the sink closes.
///
/// Returning `Ok(())` means the source finished cleanly; returning an
/// error marks the watch as failed and is logged by the session. A
/// closed sink is not an error: it just means the session stopped first.
#[async_trait]
pub trait WatchSource: Send + 'static {
    /// Run the source to completion, delivering events into `sink`.
    async fn run(self: Box<Self>, query: WatchQuery, sink: EventSink) -> Result<()>;
}

/// A source fed by hand through a tokio channel.
///
/// Useful when event production lives elsewhere, in a network client or
/// a test, and the session should just consume whatever comes down the
/// channel.
///
/// # Example
///
/// ```rust,ignore
/// let (tx, source) = ChannelSource::channel(16);
/// let session = WatchSession::builder()
///     .address("127.0.0.1:8500")
///     .mode("key")
///     .key("config/db")
///     .source(source)
///     .build()?;
/// tx.send(WatchEvent::update("config/db", "primary")).await?;
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<WatchEvent>,
}

impl ChannelSource {
    /// Wrap an existing receiver.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<WatchEvent>) -> Self {
        Self { rx }
    }

    /// Create a channel of the given capacity and a source reading it.
    #[must_use]
    pub fn channel(buffer: usize) -> (mpsc::Sender<WatchEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl WatchSource for ChannelSource {
    async fn run(mut self: Box<Self>, query: WatchQuery, sink: EventSink) -> Result<()> {
        debug!(query = %query, "channel source started");
        while let Some(event) = self.rx.recv().await {
            if sink.send(event).await.is_err() {
                debug!("sink closed, channel source stopping");
                return Ok(());
            }
        }
        debug!("channel source input ended");
        Ok(())
    }
}

enum Step {
    Emit(WatchEvent),
    Wait(Duration),
}

/// A source that plays back a fixed sequence of events.
///
/// Each step either emits an event or pauses. Mostly a test double, but
/// also handy for demos that want realistic-looking traffic without a
/// live remote.
#[derive(Default)]
pub struct ScriptedSource {
    steps: Vec<Step>,
}

impl ScriptedSource {
    /// Create an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw event.
    #[must_use]
    pub fn emit(mut self, event: WatchEvent) -> Self {
        self.steps.push(Step::Emit(event));
        self
    }

    /// Append a single-key update.
    #[must_use]
    pub fn update(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.emit(WatchEvent::update(key, value))
    }

    /// Append a whole-set refresh.
    #[must_use]
    pub fn refresh(self, pairs: impl IntoIterator<Item = KvPair>) -> Self {
        self.emit(WatchEvent::Refresh(pairs.into_iter().collect()))
    }

    /// Append an absent notification.
    #[must_use]
    pub fn absent(self) -> Self {
        self.emit(WatchEvent::Absent)
    }

    /// Append a pause between events.
    #[must_use]
    pub fn wait(mut self, duration: Duration) -> Self {
        self.steps.push(Step::Wait(duration));
        self
    }

    /// Number of steps in the script.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the script has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for ScriptedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedSource")
            .field("steps", &self.steps.len())
            .finish()
    }
}

#[async_trait]
impl WatchSource for ScriptedSource {
    async fn run(self: Box<Self>, query: WatchQuery, sink: EventSink) -> Result<()> {
        debug!(query = %query, steps = self.steps.len(), "scripted source started");
        for step in self.steps {
            match step {
                Step::Wait(duration) => tokio::time::sleep(duration).await,
                Step::Emit(event) => {
                    if sink.send(event).await.is_err() {
                        debug!("sink closed, scripted source stopping");
                        return Ok(());
                    }
                }
            }
        }
        debug!("scripted source finished");
        Ok(())
    }
}
