// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded worker pool for parallel file-level work (verify, link).
//!
//! The rest of the stack runs on tokio, so the pool fans work out across
//! `tokio::task::JoinSet` tasks rather than OS threads: bounded
//! concurrency, `wait()` drains the queue, `outcome` latches false on
//! first failure, and further `add()` calls after that are no-ops.
//! `concurrency == 0` runs jobs inline on the caller instead of spawning
//! tasks at all.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("one or more jobs reported failure")]
    JobFailed,
}

/// A unit of work submitted to the pool: carries its job data and the
/// shared output deques it reports into. Stages construct the concrete
/// future from this before calling `add`.
pub struct WorkerJob<T> {
    pub data: T,
}

impl<T> WorkerJob<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A bounded pool of concurrent workers.
///
/// `add()` enqueues a job; `wait()` blocks until every submitted job has
/// completed. After any job reports failure, `outcome()` becomes false
/// and subsequent `add()` calls are dropped without running.
pub struct WorkerPool {
    concurrency: usize,
    semaphore: Arc<Semaphore>,
    outcome: Arc<AtomicBool>,
    tasks: JoinSet<()>,
}

impl WorkerPool {
    /// Create a pool with `concurrency` concurrent workers. `0` means
    /// "run synchronously on the caller" (no task spawned).
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            outcome: Arc::new(AtomicBool::new(true)),
            tasks: JoinSet::new(),
        }
    }

    pub fn outcome(&self) -> bool {
        self.outcome.load(Ordering::SeqCst)
    }

    /// Enqueue a job. If the pool's outcome has already latched false,
    /// the job is dropped without running — later submissions become
    /// no-ops that still free the job rather than piling up behind a
    /// doomed run.
    pub async fn add<F>(&mut self, job: F)
    where
        F: Future<Output = bool> + Send + 'static,
    {
        if !self.outcome() {
            drop(job);
            return;
        }

        if self.concurrency == 0 {
            if !job.await {
                self.outcome.store(false, Ordering::SeqCst);
            }
            return;
        }

        let semaphore = Arc::clone(&self.semaphore);
        let outcome = Arc::clone(&self.outcome);
        self.tasks.spawn(async move {
            // The semaphore is never closed, so acquire only fails if the
            // pool itself has been dropped out from under the task.
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };
            if !job.await {
                outcome.store(false, Ordering::SeqCst);
            }
        });
    }

    /// Block until the queue is drained and every worker is idle.
    pub async fn wait(&mut self) -> Result<(), PoolError> {
        while self.tasks.join_next().await.is_some() {}
        if self.outcome() {
            Ok(())
        } else {
            Err(PoolError::JobFailed)
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
