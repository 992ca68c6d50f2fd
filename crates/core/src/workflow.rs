// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow: an ordered sequence of stages, each exposing
//! setup/execute/teardown, driven through three global sweeps.
//!
//! A C-style linked list of three function pointers is re-architected
//! here as `Vec<Box<dyn Stage>>`: the composer builds this sequence and
//! the driver iterates it three times.

use crate::bag::Bag;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// One of the three phases a stage goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Execute,
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Setup => "setup",
            Phase::Execute => "execute",
            Phase::Teardown => "teardown",
        };
        write!(f, "{s}")
    }
}

/// Error surfaced by a single stage phase.
#[derive(Debug, Error)]
#[error("{phase} failed in stage {stage}: {message}")]
pub struct StageError {
    pub stage: String,
    pub phase: Phase,
    pub message: String,
}

impl StageError {
    pub fn new(stage: impl Into<String>, phase: Phase, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            phase,
            message: message.into(),
        }
    }
}

/// A single stage in a workflow.
///
/// Stages pre-validate in `setup` without side effects, do bulk work in
/// `execute`, and reliably clean up in `teardown` even when a later
/// stage's `setup`/`execute` fails.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable name used in logs and `StageError`.
    fn name(&self) -> &str;

    async fn setup(&self, bag: &Bag) -> Result<(), StageError> {
        let _ = bag;
        Ok(())
    }

    async fn execute(&self, bag: &Bag) -> Result<(), StageError>;

    async fn teardown(&self, bag: &Bag) -> Result<(), StageError> {
        let _ = bag;
        Ok(())
    }
}

/// An immutable, ordered sequence of stages.
pub struct Workflow {
    stages: Vec<Box<dyn Stage>>,
}

impl Workflow {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }
}

/// Drives a workflow's three-phase sweep over a shared context bag.
///
/// All stages' setups run (in order) before any stage executes; all
/// executes run before any stage tears down. If a stage fails setup or
/// execute, the remaining stages of that phase are skipped, but
/// teardown still runs — head to tail, in order — on every stage whose
/// setup succeeded, so partial state is always released. The first
/// failure encountered is the operation's result.
pub struct Driver;

impl Driver {
    /// Run `workflow` to completion against `bag`.
    ///
    /// Returns the first error encountered across the whole sweep, if
    /// any. Teardown always runs for every stage that completed setup,
    /// even after a failure earlier in the sweep.
    pub async fn run(workflow: &Workflow, bag: &Bag) -> Result<(), StageError> {
        let mut setup_ok = vec![false; workflow.stages.len()];
        let mut first_error: Option<StageError> = None;

        for (i, stage) in workflow.stages.iter().enumerate() {
            tracing::debug!(stage = stage.name(), phase = %Phase::Setup, "running stage phase");
            match stage.setup(bag).await {
                Ok(()) => setup_ok[i] = true,
                Err(e) => {
                    tracing::warn!(stage = stage.name(), error = %e, "setup failed");
                    first_error = Some(e);
                    break;
                }
            }
        }

        if first_error.is_none() {
            for (i, stage) in workflow.stages.iter().enumerate() {
                if !setup_ok[i] {
                    break;
                }
                tracing::debug!(stage = stage.name(), phase = %Phase::Execute, "running stage phase");
                if let Err(e) = stage.execute(bag).await {
                    tracing::warn!(stage = stage.name(), error = %e, "execute failed");
                    first_error = Some(e);
                    break;
                }
            }
        }

        // Teardown every stage whose setup succeeded, head to tail,
        // regardless of where the failure (if any) occurred.
        for (i, stage) in workflow.stages.iter().enumerate() {
            if !setup_ok[i] {
                continue;
            }
            tracing::debug!(stage = stage.name(), phase = %Phase::Teardown, "running stage phase");
            if let Err(e) = stage.teardown(bag).await {
                tracing::warn!(stage = stage.name(), error = %e, "teardown failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
