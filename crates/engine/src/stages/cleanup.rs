// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Removes residual files left by lower layers (e.g. `*.old` files after
//! a restore) that the target database would otherwise reject at
//! startup.

use async_trait::async_trait;
use std::path::PathBuf;

use pgmoneta_core::bag::Bag;
use pgmoneta_core::workflow::{Phase, Stage, StageError};

const DEFAULT_SUFFIXES: &[&str] = &[".old", ".tmp"];

pub struct CleanupStage {
    dir: PathBuf,
    suffixes: Vec<String>,
}

impl CleanupStage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_suffixes(dir: impl Into<PathBuf>, suffixes: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            suffixes,
        }
    }
}

#[async_trait]
impl Stage for CleanupStage {
    fn name(&self) -> &str {
        "cleanup"
    }

    async fn execute(&self, _bag: &Bag) -> Result<(), StageError> {
        if !self.dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;

        for entry in entries {
            let entry = entry.map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.suffixes.iter().any(|s| name.ends_with(s.as_str())) {
                let path = entry.path();
                let result = if path.is_dir() {
                    std::fs::remove_dir_all(&path)
                } else {
                    std::fs::remove_file(&path)
                };
                result.map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
