//! Load tests for the mirror and the session pipeline.
//!
//! These tests verify the system holds up under volume:
//! - 10k+ keys in a single mirror
//! - Parallel writers and snapshot readers
//! - Sustained event streams through a session
//!
//! Run with: `cargo test --package integration-tests load_tests -- --nocapture`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use kvwatch::prelude::*;
use tokio::sync::Barrier;

#[tokio::test]
async fn test_10k_keys() {
    let cache = Arc::new(KvCache::with_capacity(10_000));
    let num_keys = 10_000;

    let start = Instant::now();
    for i in 0..num_keys {
        cache.set(format!("svc/node-{}", i), format!("10.0.0.1:{}", i));
    }
    let set_duration = start.elapsed();
    println!(
        "Set {} keys in {:?} ({:.2} µs/op)",
        num_keys,
        set_duration,
        set_duration.as_micros() as f64 / num_keys as f64
    );

    let start = Instant::now();
    for i in 0..num_keys {
        assert!(cache.get(&format!("svc/node-{}", i)).is_some());
    }
    let get_duration = start.elapsed();
    println!(
        "Get {} keys in {:?} ({:.2} µs/op)",
        num_keys,
        get_duration,
        get_duration.as_micros() as f64 / num_keys as f64
    );

    let stats = cache.stats();
    println!(
        "Cache stats: hits={}, misses={}, hit_rate={:.2}%",
        stats.hits(),
        stats.misses(),
        stats.hit_rate() * 100.0
    );

    assert_eq!(cache.len(), num_keys);
    assert_eq!(stats.hits(), num_keys as u64);
    assert_eq!(stats.hit_rate(), 1.0);
}

#[tokio::test]
async fn test_concurrent_10k_keys() {
    let cache = Arc::new(KvCache::new());
    let num_keys = 10_000;
    let num_tasks = 10;
    let keys_per_task = num_keys / num_tasks;

    let barrier = Arc::new(Barrier::new(num_tasks));
    let total_ops = Arc::new(AtomicU64::new(0));

    let start = Instant::now();

    let mut handles = Vec::new();
    for task_id in 0..num_tasks {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        let total_ops = Arc::clone(&total_ops);

        handles.push(tokio::spawn(async move {
            // Wait for all tasks to be ready
            barrier.wait().await;

            for i in 0..keys_per_task {
                cache.set(
                    format!("svc/task-{}-node-{}", task_id, i),
                    format!("v{}", i),
                );
                total_ops.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    for handle in handles {
        handle.await.expect("Task panicked");
    }

    let duration = start.elapsed();
    let ops = total_ops.load(Ordering::Relaxed);
    println!(
        "Concurrent set: {} ops in {:?} ({:.2} µs/op, {:.0} ops/sec)",
        ops,
        duration,
        duration.as_micros() as f64 / ops as f64,
        ops as f64 / duration.as_secs_f64()
    );

    assert_eq!(cache.len(), num_keys);
}

#[tokio::test]
async fn test_refresh_churn() {
    let cache = Arc::new(KvCache::new());
    let num_members = 1000;
    let num_rounds = 100;

    let start = Instant::now();
    for round in 0..num_rounds {
        let members: Vec<KvPair> = (0..num_members)
            .map(|i| KvPair::new(format!("svc/node-{}", i), format!("round-{}", round)))
            .collect();
        cache.refresh(members);
    }
    let duration = start.elapsed();

    println!(
        "{} refreshes of {} members in {:?} ({:.2} µs/refresh)",
        num_rounds,
        num_members,
        duration,
        duration.as_micros() as f64 / num_rounds as f64
    );

    assert_eq!(cache.len(), num_members);
    assert_eq!(
        cache.get("svc/node-0").as_deref(),
        Some(format!("round-{}", num_rounds - 1).as_str())
    );
}

#[tokio::test]
async fn test_mixed_workload() {
    let cache = Arc::new(KvCache::new());
    let num_keys = 1000;
    let num_operations = 10_000;

    // Pre-populate
    for i in 0..num_keys {
        cache.set(format!("svc/node-{}", i), format!("v{}", i));
    }

    // Run mixed workload: 90% reads, 10% writes
    let start = Instant::now();
    let mut reads = 0u64;
    let mut writes = 0u64;

    for i in 0..num_operations {
        let key = format!("svc/node-{}", i % num_keys);

        if i % 10 == 0 {
            // 10% writes
            cache.set(key, format!("v{}", i));
            writes += 1;
        } else {
            // 90% reads
            let _ = cache.get(&key);
            reads += 1;
        }
    }

    let duration = start.elapsed();

    println!(
        "Mixed workload: {} reads, {} writes in {:?}",
        reads, writes, duration
    );
    println!(
        "  Throughput: {:.0} ops/sec",
        num_operations as f64 / duration.as_secs_f64()
    );

    let avg_latency_us = duration.as_micros() as f64 / num_operations as f64;
    println!("  Latency: {:.2} µs/op", avg_latency_us);
    assert!(
        avg_latency_us < 100.0,
        "Average latency {} µs exceeds 100 µs target",
        avg_latency_us
    );
}

/// Stress test: concurrent snapshot readers and writers.
#[tokio::test]
async fn test_concurrent_readers_writers() {
    let cache = Arc::new(KvCache::new());
    let num_keys = 1000;
    let num_readers = 8;
    let num_writers = 2;
    let ops_per_task = 1000;

    // Pre-populate
    for i in 0..num_keys {
        cache.set(format!("svc/node-{}", i), format!("v{}", i));
    }

    let barrier = Arc::new(Barrier::new(num_readers + num_writers));
    let read_count = Arc::new(AtomicU64::new(0));
    let write_count = Arc::new(AtomicU64::new(0));

    let start = Instant::now();
    let mut handles = Vec::new();

    // Spawn readers
    for _ in 0..num_readers {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        let read_count = Arc::clone(&read_count);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;

            for i in 0..ops_per_task {
                let _ = cache.get(&format!("svc/node-{}", i % num_keys));
                read_count.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    // Spawn writers
    for writer_id in 0..num_writers {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        let write_count = Arc::clone(&write_count);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;

            for i in 0..ops_per_task {
                cache.set(
                    format!("svc/node-{}", i % num_keys),
                    format!("v{}-{}", writer_id, i),
                );
                write_count.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    for handle in handles {
        handle.await.expect("Task panicked");
    }

    let duration = start.elapsed();
    let total_reads = read_count.load(Ordering::Relaxed);
    let total_writes = write_count.load(Ordering::Relaxed);
    let total_ops = total_reads + total_writes;

    println!(
        "Concurrent R/W: {} reads, {} writes in {:?}",
        total_reads, total_writes, duration
    );
    let ops_per_sec = total_ops as f64 / duration.as_secs_f64();
    println!("  Throughput: {:.0} ops/sec", ops_per_sec);

    // Should handle at least 100k ops/sec even on slow machines
    assert!(
        ops_per_sec > 100_000.0,
        "Throughput {} ops/sec is below 100k target",
        ops_per_sec
    );
}

/// Sustained event stream through a full session.
#[tokio::test]
async fn test_session_under_sustained_events() {
    let num_keys = 10;
    let num_rounds = 100;

    let (tx, source) = ChannelSource::channel(16);
    let session = WatchSession::builder()
        .address("127.0.0.1:8500")
        .mode("keyprefix")
        .key("svc/")
        .source(source)
        .build()
        .unwrap();

    let start = Instant::now();
    for round in 0..num_rounds {
        for key in 0..num_keys {
            tx.send(WatchEvent::update(
                format!("svc/node-{}", key),
                format!("round-{}", round),
            ))
            .await
            .unwrap();
        }
    }
    drop(tx);

    // Order is preserved per key, so once the final round is visible for
    // every key the mirror must show exactly the last written values.
    let deadline = Instant::now() + Duration::from_secs(5);
    let expected = format!("round-{}", num_rounds - 1);
    loop {
        let snapshot = session.snapshot();
        let done = snapshot.len() == num_keys
            && snapshot.iter().all(|(_, value)| value == expected);
        if done {
            break;
        }
        assert!(
            Instant::now() < deadline,
            "mirror did not drain the event stream in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    println!(
        "Applied {} events through the session in {:?}",
        num_keys * num_rounds,
        start.elapsed()
    );
    session.stop();
}
