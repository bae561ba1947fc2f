// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::missing_errors_doc)] // Test documentation
#![allow(clippy::similar_names)] // Test variable naming
#![allow(clippy::needless_pass_by_value)] // Test functions

//! Stress test: many threads hammering a handful of journal names.
//!
//! Validates that concurrent acquire/release/lock/unlock never produces a
//! double-allocated slot, a dropped reader, or a stuck lock, across a
//! thread count well above the single-entry slot count.
//!
//! Run with: `cargo test -p journal-pool --test stress_concurrent_acquire -- --ignored`
//! Timeout: 30 seconds max.

use journal_pool::{FsJournalConfig, MmapJournalReader, PoolError, ReaderPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

const NUM_THREADS: usize = 64;
const ITERATIONS_PER_THREAD: usize = 200;
const NUM_NAMES: usize = 4;
const TEST_TIMEOUT: Duration = Duration::from_secs(30);

#[test]
#[ignore]
fn stress_many_threads_acquire_release_distinct_names() {
    let start = Instant::now();
    let dir = tempfile::tempdir().expect("tempdir");
    let names: Vec<String> = (0..NUM_NAMES).map(|i| format!("journal-{i}")).collect();
    for name in &names {
        std::fs::create_dir_all(dir.path().join(name)).expect("seed journal dir");
    }

    let config = FsJournalConfig::new(dir.path());
    let pool = ReaderPool::<MmapJournalReader, FsJournalConfig>::new(config, 8);
    let barrier = Arc::new(Barrier::new(NUM_THREADS));
    let acquisitions = Arc::new(AtomicUsize::new(0));

    println!("[stress_concurrent_acquire] spawning {NUM_THREADS} threads...");
    let threads: Vec<_> = (0..NUM_THREADS)
        .map(|i| {
            let pool = pool.clone();
            let barrier = barrier.clone();
            let acquisitions = acquisitions.clone();
            let name = names[i % NUM_NAMES].clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ITERATIONS_PER_THREAD {
                    match pool.reader(&name) {
                        Ok(handle) => {
                            handle.close().expect("close should always succeed");
                            acquisitions.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(PoolError::Locked(_) | PoolError::Retry(_)) => {
                            // Another thread's administrative lock/unlock
                            // window; back off and try again.
                            thread::yield_now();
                        }
                        Err(e) => panic!("unexpected acquire failure: {e}"),
                    }
                }
            })
        })
        .collect();

    for t in threads {
        t.join().expect("worker thread panicked");
    }

    assert_eq!(
        acquisitions.load(Ordering::Relaxed),
        NUM_THREADS * ITERATIONS_PER_THREAD
    );
    assert!(
        start.elapsed() < TEST_TIMEOUT,
        "stress test exceeded its time budget"
    );
    println!(
        "[stress_concurrent_acquire] completed {} acquisitions in {:?}",
        NUM_THREADS * ITERATIONS_PER_THREAD,
        start.elapsed()
    );
}

#[test]
#[ignore]
fn stress_lock_drains_every_concurrently_held_slot() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("hot")).expect("seed journal dir");

    let config = FsJournalConfig::new(dir.path());
    let pool = ReaderPool::<MmapJournalReader, FsJournalConfig>::new(config, 2);

    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let workers: Vec<_> = (0..8)
        .map(|_| {
            let pool = pool.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    if let Ok(handle) = pool.reader("hot") {
                        thread::yield_now();
                        let _ = handle.close();
                    }
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(50));

    let mut locked = false;
    for _ in 0..10_000 {
        match pool.lock("hot") {
            Ok(()) => {
                locked = true;
                break;
            }
            Err(PoolError::Retry(_)) => thread::yield_now(),
            Err(e) => panic!("unexpected lock failure: {e}"),
        }
    }
    assert!(locked, "lock() never succeeded under sustained contention");
    pool.unlock("hot");

    stop.store(true, Ordering::Relaxed);
    for w in workers {
        w.join().expect("worker thread panicked");
    }
}
