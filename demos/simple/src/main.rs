//! Simple Watch Demo
//!
//! This demo mirrors a slice of a key/value namespace and polls the
//! mirror once a second, printing every change between consecutive
//! snapshots. The remote side is played by a scripted source, so the
//! address flag is validated but never contacted; swap in your own
//! `WatchSource` to point it at something real.
//!
//! Run with:
//! ```bash
//! cargo run --package simple-watch -- -t keyprefix -k svc/
//! ```

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use kvwatch::prelude::*;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Mirror a key/value namespace and print changes
#[derive(Parser, Debug)]
#[command(name = "simple-watch")]
#[command(about = "Mirror a key/value namespace and print changes", long_about = None)]
struct Args {
    /// Remote source address
    #[arg(short = 's', long = "server", default_value = "127.0.0.1:8500")]
    server: String,

    /// Watch type, one of key keyprefix
    #[arg(short = 't', long = "type", default_value = "keyprefix")]
    mode: String,

    /// Key or key prefix to mirror
    #[arg(short = 'k', long = "key", default_value = "svc/")]
    key: String,

    /// Seconds between snapshot polls
    #[arg(long, default_value_t = 1)]
    interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting simple watch demo");
    info!("{}", kvwatch::version::version_string());

    let session = WatchSession::builder()
        .address(&args.server)
        .mode(&args.mode)
        .key(&args.key)
        .source(demo_script())
        .build()?;

    info!("Watching {}", session.query());
    info!("Press Ctrl+C to stop");

    let mut previous = session.snapshot();
    print_snapshot(&previous);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(args.interval)) => {
                let current = session.snapshot();
                if current != previous {
                    print_changes(&previous, &current);
                }
                previous = current;
            }
            _ = signal::ctrl_c() => {
                break;
            }
        }
    }

    info!("Stopping...");
    session.stop();
    Ok(())
}

/// Print the full mirror contents, sorted by key.
fn print_snapshot(snapshot: &Snapshot) {
    info!("Initial mirror holds {} keys", snapshot.len());
    let mut pairs: Vec<(&str, &str)> = snapshot.iter().collect();
    pairs.sort_unstable();
    for (key, value) in pairs {
        info!("[{}] [{}]", key, value);
    }
}

/// Print one poll's worth of differences.
fn print_changes(previous: &Snapshot, current: &Snapshot) {
    let diff = previous.diff(current);
    for pair in diff.added() {
        info!("[{}] New [{}]", pair.key, pair.value);
    }
    for change in diff.changed() {
        info!("[{}] [{}] -->[{}]", change.key, change.from, change.to);
    }
    for pair in diff.removed() {
        info!("[{}] removed", pair.key);
    }
}

/// Sample traffic resembling a small service catalog under churn.
fn demo_script() -> ScriptedSource {
    ScriptedSource::new()
        .wait(Duration::from_millis(500))
        .refresh([
            KvPair::new("svc/web", "10.0.0.1:80"),
            KvPair::new("svc/db", "10.0.0.2:5432"),
        ])
        .wait(Duration::from_millis(1500))
        .update("svc/web", "10.0.0.3:80")
        .wait(Duration::from_millis(1500))
        // svc/db drops out of the catalog, svc/api joins
        .refresh([
            KvPair::new("svc/web", "10.0.0.3:80"),
            KvPair::new("svc/api", "10.0.0.4:9000"),
        ])
        .wait(Duration::from_millis(1500))
        .absent()
}
