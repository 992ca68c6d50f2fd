// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention: prune backups that have aged out, keeping the most recent
//! `count` and/or everything newer than `duration`. A backup with its
//! `keep` flag set is never swept, regardless of policy.
//!
//! Mirrors `retention.c`, `wf_cleanup.c`'s cousin in the original CLI —
//! a backup tool that never prunes anything isn't complete.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::path::PathBuf;

use pgmoneta_core::bag::Bag;
use pgmoneta_core::workflow::{Phase, Stage, StageError};
use pgmoneta_storage::store;

#[derive(Debug, Clone, Copy, Default)]
pub struct RetentionPolicy {
    /// Always keep at least this many of the most recent backups.
    pub count: Option<usize>,
    /// Always keep backups newer than this age.
    pub duration: Option<chrono::Duration>,
}

pub struct RetentionStage {
    server_root: PathBuf,
    policy: RetentionPolicy,
    now: DateTime<Local>,
}

impl RetentionStage {
    pub fn new(server_root: impl Into<PathBuf>, policy: RetentionPolicy, now: DateTime<Local>) -> Self {
        Self {
            server_root: server_root.into(),
            policy,
            now,
        }
    }

    fn label_age(&self, label: &str) -> Option<chrono::Duration> {
        let naive = NaiveDateTime::parse_from_str(label, "%Y%m%d%H%M%S").ok()?;
        let at = Local.from_local_datetime(&naive).single()?;
        Some(self.now - at)
    }
}

#[async_trait]
impl Stage for RetentionStage {
    fn name(&self) -> &str {
        "retention"
    }

    async fn execute(&self, bag: &Bag) -> Result<(), StageError> {
        if self.policy.count.is_none() && self.policy.duration.is_none() {
            return Ok(());
        }

        let backups = store::get_backups(&self.server_root)
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;

        let recent_labels: std::collections::HashSet<&str> = match self.policy.count {
            Some(count) => backups
                .iter()
                .rev()
                .take(count)
                .map(|b| b.label.as_str())
                .collect(),
            None => std::collections::HashSet::new(),
        };

        for backup in &backups {
            if backup.keep {
                continue;
            }
            if recent_labels.contains(backup.label.as_str()) {
                continue;
            }
            if let Some(duration) = self.policy.duration {
                if let Some(age) = self.label_age(&backup.label) {
                    if age <= duration {
                        continue;
                    }
                }
            }

            store::delete_backup(&self.server_root, &backup.label)
                .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
            bag.with_mut("removed", |v| {
                if let Some(deque) = v.as_deque_mut() {
                    deque.push_back(serde_json::Value::String(backup.label.clone()));
                }
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "retention_tests.rs"]
mod tests;
