// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::AtomicUsize;

#[tokio::test]
async fn outcome_true_when_every_job_succeeds() {
    let mut pool = WorkerPool::new(4);
    for _ in 0..10 {
        pool.add(async { true }).await;
    }
    pool.wait().await.unwrap();
    assert!(pool.outcome());
}

#[tokio::test]
async fn outcome_false_when_any_job_fails() {
    let mut pool = WorkerPool::new(4);
    pool.add(async { true }).await;
    pool.add(async { false }).await;
    pool.add(async { true }).await;

    let err = pool.wait().await.unwrap_err();
    assert!(matches!(err, PoolError::JobFailed));
    assert!(!pool.outcome());
}

#[tokio::test]
async fn jobs_submitted_after_failure_are_dropped_without_running() {
    let mut pool = WorkerPool::new(2);
    pool.add(async { false }).await;
    pool.wait().await.unwrap_err();

    let ran = Arc::new(AtomicBool::new(false));
    let ran2 = Arc::clone(&ran);
    pool.add(async move {
        ran2.store(true, Ordering::SeqCst);
        true
    })
    .await;
    pool.wait().await.unwrap_err();

    assert!(!ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn synchronous_pool_runs_jobs_inline() {
    let mut pool = WorkerPool::new(0);
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..5 {
        let counter = Arc::clone(&counter);
        pool.add(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })
        .await;
    }
    // Synchronous jobs already ran during add(); wait() is a no-op.
    assert_eq!(counter.load(Ordering::SeqCst), 5);
    pool.wait().await.unwrap();
}

#[tokio::test]
async fn concurrency_bound_limits_simultaneous_jobs() {
    use std::sync::atomic::AtomicUsize;
    use tokio::time::{sleep, Duration};

    let mut pool = WorkerPool::new(2);
    let concurrent = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    for _ in 0..8 {
        let concurrent = Arc::clone(&concurrent);
        let max_seen = Arc::clone(&max_seen);
        pool.add(async move {
            let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(10)).await;
            concurrent.fetch_sub(1, Ordering::SeqCst);
            true
        })
        .await;
    }
    pool.wait().await.unwrap();
    assert!(max_seen.load(Ordering::SeqCst) <= 2);
}
