// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Walks a backup's `data/` tree, hashes every file, and writes the
//! resulting rows to `backup.manifest`. Runs at backup time, before
//! `LinkStage` has anything to diff against.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use pgmoneta_adapters::hash::HashAlgorithm;
use pgmoneta_core::bag::{Bag, Value};
use pgmoneta_core::manifest::ManifestWriter;
use pgmoneta_core::workflow::{Phase, Stage, StageError};

pub struct HashStage {
    data_dir: PathBuf,
    manifest_path: PathBuf,
    algorithm: HashAlgorithm,
}

impl HashStage {
    pub fn new(data_dir: impl Into<PathBuf>, manifest_path: impl Into<PathBuf>, algorithm: HashAlgorithm) -> Self {
        Self {
            data_dir: data_dir.into(),
            manifest_path: manifest_path.into(),
            algorithm,
        }
    }

    fn walk(root: &Path, dir: &Path, out: &mut Vec<(PathBuf, PathBuf)>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                Self::walk(root, &path, out)?;
            } else {
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                out.push((path, relative));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Stage for HashStage {
    fn name(&self) -> &str {
        "hash"
    }

    async fn execute(&self, bag: &Bag) -> Result<(), StageError> {
        let mut files = Vec::new();
        if self.data_dir.exists() {
            Self::walk(&self.data_dir, &self.data_dir, &mut files)
                .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
        }
        files.sort();

        let mut writer = ManifestWriter::create(&self.manifest_path)
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;

        let mut total_bytes: u64 = 0;
        for (absolute, relative) in &files {
            let digest = pgmoneta_adapters::hash::hash_file(self.algorithm, absolute)
                .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
            writer
                .write_entry(relative, &digest)
                .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
            total_bytes += std::fs::metadata(absolute)
                .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?
                .len();
        }
        writer
            .flush()
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;

        bag.with_mut("backup_size", |v| *v = Value::UInt(total_bytes));
        bag.with_mut("file_count", |v| *v = Value::UInt(files.len() as u64));

        Ok(())
    }
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod tests;
