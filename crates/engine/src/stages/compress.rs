// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compresses every file under a backup's `data/` tree in place, using
//! whichever [`Compressor`] capability the caller injected.
//!
//! Also totals the pre-compression size of every file it touches into
//! the `restore_size` bag key — the only point in the pipeline that
//! still sees the expanded bytes, since `HashStage` runs after this one
//! over the now-compressed content.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pgmoneta_adapters::compress::Compressor;
use pgmoneta_core::bag::{Bag, Value};
use pgmoneta_core::workflow::{Phase, Stage, StageError};

pub struct CompressStage {
    data_dir: PathBuf,
    compressor: Arc<dyn Compressor>,
}

impl CompressStage {
    pub fn new(data_dir: impl Into<PathBuf>, compressor: Arc<dyn Compressor>) -> Self {
        Self {
            data_dir: data_dir.into(),
            compressor,
        }
    }

    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                Self::walk(&path, out)?;
            } else {
                out.push(path);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Stage for CompressStage {
    fn name(&self) -> &str {
        "compress"
    }

    async fn execute(&self, bag: &Bag) -> Result<(), StageError> {
        if !self.data_dir.exists() {
            return Ok(());
        }

        let mut files = Vec::new();
        Self::walk(&self.data_dir, &mut files)
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;

        let mut expanded_bytes: u64 = 0;
        for path in files {
            expanded_bytes += std::fs::metadata(&path)
                .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?
                .len();

            let tmp = path.with_extension("zst.tmp");
            self.compressor
                .compress_file(&path, &tmp)
                .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
            std::fs::rename(&tmp, &path)
                .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
        }

        bag.with_mut("restore_size", |v| *v = Value::UInt(expanded_bytes));

        Ok(())
    }
}

#[cfg(test)]
#[path = "compress_tests.rs"]
mod tests;
