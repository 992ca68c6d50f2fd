// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bundles a backup's `data/` tree into a single `.tar.zst` file, for
//! callers that want one artifact to ship off the server rather than a
//! directory tree plus a manifest.
//!
//! Builds the tarball at a temporary path alongside the requested output
//! and renames it into place once `tar::Builder` has finished writing,
//! so a reader never observes a partially-written archive at the final
//! path.

use async_trait::async_trait;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use pgmoneta_adapters::compress::Compressor;
use pgmoneta_core::bag::Bag;
use pgmoneta_core::workflow::{Phase, Stage, StageError};

pub struct ArchiveStage {
    data_dir: PathBuf,
    output_path: PathBuf,
    compressor: Arc<dyn Compressor>,
}

impl ArchiveStage {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        compressor: Arc<dyn Compressor>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_path: output_path.into(),
            compressor,
        }
    }

    fn build_tar(&self, tar_path: &std::path::Path) -> std::io::Result<()> {
        let file = File::create(tar_path)?;
        let mut builder = tar::Builder::new(file);
        builder.append_dir_all("data", &self.data_dir)?;
        builder.finish()
    }
}

#[async_trait]
impl Stage for ArchiveStage {
    fn name(&self) -> &str {
        "archive"
    }

    async fn execute(&self, _bag: &Bag) -> Result<(), StageError> {
        let stage_err = |e: std::io::Error| StageError::new(self.name(), Phase::Execute, e.to_string());

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(stage_err)?;
            }
        }

        let tar_path = self.output_path.with_extension("tar.tmp");
        let result = self
            .build_tar(&tar_path)
            .map_err(stage_err)
            .and_then(|()| {
                self.compressor
                    .compress_file(&tar_path, &self.output_path)
                    .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))
            });

        let _ = fs::remove_file(&tar_path);
        result
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
