//! End-to-end watch session tests.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use kvwatch::prelude::*;
use tokio::sync::oneshot;
use tokio::time::timeout;

async fn wait_until(what: &str, check: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !check() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn whole_key_watch_end_to_end() {
    let session = WatchSession::builder()
        .address("127.0.0.1:8500")
        .mode("key")
        .key("config/db")
        .source(
            ScriptedSource::new()
                .update("config/db", "primary")
                .wait(Duration::from_millis(5))
                .update("config/db", "replica"),
        )
        .build()
        .unwrap();

    wait_until("the final value", || {
        session.get("config/db").as_deref() == Some("replica")
    })
    .await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("config/db"), Some("replica"));
    session.stop();
}

#[tokio::test]
async fn prefix_watch_applies_whole_member_sets() {
    let session = WatchSession::builder()
        .address("127.0.0.1:8500")
        .mode("keyprefix")
        .key("svc/")
        .source(
            ScriptedSource::new()
                .refresh([
                    KvPair::new("svc/web", "10.0.0.1:80"),
                    KvPair::new("svc/db", "10.0.0.2:5432"),
                ])
                .wait(Duration::from_millis(5))
                // svc/db disappears, svc/api arrives
                .refresh([
                    KvPair::new("svc/web", "10.0.0.1:80"),
                    KvPair::new("svc/api", "10.0.0.3:9000"),
                ]),
        )
        .build()
        .unwrap();

    wait_until("the second member set", || {
        session.get("svc/api").is_some() && session.get("svc/db").is_none()
    })
    .await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.contains_key("svc/web"));
    session.stop();
}

#[tokio::test]
async fn absent_target_empties_the_mirror() {
    let session = WatchSession::builder()
        .address("127.0.0.1:8500")
        .mode("key")
        .key("config/db")
        .source(ScriptedSource::new().update("config/db", "primary").absent())
        .build()
        .unwrap();

    wait_until("the absent notification", || {
        session.cache().stats().flushes() >= 1
    })
    .await;
    assert_eq!(session.get("config/db"), None);
    session.stop();
}

#[tokio::test]
async fn mirror_outlives_a_finished_source() {
    let session = WatchSession::builder()
        .address("127.0.0.1:8500")
        .mode("key")
        .key("config/db")
        .source(ScriptedSource::new().update("config/db", "primary"))
        .build()
        .unwrap();

    wait_until("the value", || session.get("config/db").is_some()).await;

    // The script has long finished; reads still serve the last state.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(session.get("config/db").as_deref(), Some("primary"));
    assert!(!session.is_stopped());
    session.stop();
}

#[tokio::test]
async fn stop_flushes_and_is_idempotent() {
    let (tx, source) = ChannelSource::channel(8);
    let session = WatchSession::builder()
        .address("127.0.0.1:8500")
        .mode("keyprefix")
        .key("svc/")
        .source(source)
        .build()
        .unwrap();

    tx.send(WatchEvent::update("svc/web", "up")).await.unwrap();
    wait_until("the first event", || session.get("svc/web").is_some()).await;

    session.stop();
    assert!(session.is_stopped());
    assert!(session.snapshot().is_empty());

    session.stop();
    assert!(session.snapshot().is_empty());

    // Later traffic never reaches the mirror.
    let _ = tx.send(WatchEvent::update("svc/late", "x")).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.get("svc/late"), None);
}

#[tokio::test]
async fn bogus_mode_never_starts_a_session() {
    let result = WatchSession::builder()
        .address("127.0.0.1:8500")
        .mode("keylist")
        .key("svc/")
        .source(ScriptedSource::new())
        .build();

    match result {
        Err(WatchError::UnsupportedMode { mode }) => assert_eq!(mode, "keylist"),
        other => panic!("expected unsupported mode, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_key_never_starts_a_session() {
    let result = WatchSession::builder()
        .address("127.0.0.1:8500")
        .mode("key")
        .key("  ")
        .source(ScriptedSource::new())
        .build();

    assert!(matches!(result, Err(WatchError::InvalidQuery { .. })));
}

/// Hands its sink back to the test instead of producing events.
struct SinkProbe {
    tx: oneshot::Sender<EventSink>,
}

#[async_trait]
impl WatchSource for SinkProbe {
    async fn run(self: Box<Self>, _query: WatchQuery, sink: EventSink) -> Result<()> {
        let _ = self.tx.send(sink);
        Ok(())
    }
}

#[tokio::test]
async fn sources_see_session_closed_after_stop() {
    let (probe_tx, probe_rx) = oneshot::channel();
    let session = WatchSession::builder()
        .address("127.0.0.1:8500")
        .mode("key")
        .key("config/db")
        .source(SinkProbe { tx: probe_tx })
        .build()
        .unwrap();

    let sink = probe_rx.await.unwrap();
    sink.update("config/db", "primary").await.unwrap();
    wait_until("the probe update", || session.get("config/db").is_some()).await;

    session.stop();

    // The pump is gone; delivery now fails with the closed-session error.
    let err = async {
        loop {
            if let Err(err) = sink.update("config/db", "again").await {
                return err;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
    .await;
    assert!(matches!(err, WatchError::SessionClosed));
    assert!(sink.is_closed());
}

#[tokio::test]
async fn dropping_a_session_winds_down_its_source() {
    let (tx, source) = ChannelSource::channel(4);
    let session = WatchSession::builder()
        .address("127.0.0.1:8500")
        .mode("keyprefix")
        .key("svc/")
        .source(source)
        .build()
        .unwrap();
    drop(session);

    let wound_down = async {
        loop {
            if tx.send(WatchEvent::Absent).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    timeout(Duration::from_secs(2), wound_down)
        .await
        .expect("source should wind down after the session is dropped");
}
