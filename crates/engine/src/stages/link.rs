// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads the new backup's manifest and the newest valid predecessor's
//! manifest (same major version), diffs them, and hardlinks every
//! unchanged file into the new backup instead of storing it twice.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Instant;

use pgmoneta_core::bag::Bag;
use pgmoneta_core::manifest::{self, ManifestReader};
use pgmoneta_core::pool::WorkerPool;
use pgmoneta_core::workflow::{Phase, Stage, StageError};
use pgmoneta_storage::info::{InfoFile, KEY_LINKING_ELAPSED};

/// The newest valid predecessor backup sharing the new backup's major
/// version, if one exists.
pub struct Predecessor {
    pub manifest_path: PathBuf,
    pub data_dir: PathBuf,
}

pub struct LinkStage {
    new_manifest_path: PathBuf,
    new_data_dir: PathBuf,
    predecessor: Option<Predecessor>,
    info_path: PathBuf,
    worker_count: usize,
}

impl LinkStage {
    pub fn new(
        new_manifest_path: impl Into<PathBuf>,
        new_data_dir: impl Into<PathBuf>,
        predecessor: Option<Predecessor>,
        info_path: impl Into<PathBuf>,
        worker_count: usize,
    ) -> Self {
        Self {
            new_manifest_path: new_manifest_path.into(),
            new_data_dir: new_data_dir.into(),
            predecessor,
            info_path: info_path.into(),
            worker_count,
        }
    }

    /// Replace `target` with a hardlink to `source`. Returns `false` (the
    /// worker-job failure contract) on any I/O error.
    async fn link_one(source: PathBuf, target: PathBuf) -> bool {
        if std::fs::remove_file(&target).is_err() {
            return false;
        }
        std::fs::hard_link(&source, &target).is_ok()
    }
}

#[async_trait]
impl Stage for LinkStage {
    fn name(&self) -> &str {
        "link"
    }

    async fn execute(&self, _bag: &Bag) -> Result<(), StageError> {
        let Some(predecessor) = &self.predecessor else {
            return Ok(());
        };

        let start = Instant::now();

        let new_rows = ManifestReader::read_all(&self.new_manifest_path)
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
        let old_rows = ManifestReader::read_all(&predecessor.manifest_path)
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;

        let diff = manifest::diff(&old_rows, &new_rows);

        let mut pool = WorkerPool::new(self.worker_count);
        for path in new_rows.keys() {
            if !diff.is_link_candidate(path) {
                continue;
            }
            let source = predecessor.data_dir.join(path);
            let target = self.new_data_dir.join(path);
            pool.add(Self::link_one(source, target)).await;
        }

        pool.wait()
            .await
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;

        let elapsed = start.elapsed().as_secs_f64();
        let mut info = if self.info_path.exists() {
            InfoFile::open(&self.info_path).map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?
        } else {
            InfoFile::new()
        };
        info.set_double(KEY_LINKING_ELAPSED, elapsed);
        info.write(&self.info_path)
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
