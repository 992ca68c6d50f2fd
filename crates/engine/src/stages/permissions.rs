// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applies a fixed permission policy to a backup/restore directory tree,
//! or to a single archive file.

use async_trait::async_trait;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use pgmoneta_core::bag::Bag;
use pgmoneta_core::workflow::{Phase, Stage, StageError};

const DIR_MODE: u32 = 0o700;
const FILE_MODE: u32 = 0o600;

/// What `PermissionsStage` chmods: a directory tree (backup/restore
/// target) or a single file (an archive).
pub enum PermissionsTarget {
    Directory(PathBuf),
    File(PathBuf),
}

pub struct PermissionsStage {
    target: PermissionsTarget,
}

impl PermissionsStage {
    pub fn for_directory(path: impl Into<PathBuf>) -> Self {
        Self {
            target: PermissionsTarget::Directory(path.into()),
        }
    }

    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self {
            target: PermissionsTarget::File(path.into()),
        }
    }

    fn set_mode(path: &std::path::Path, mode: u32) -> std::io::Result<()> {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }

    fn apply_recursive(dir: &std::path::Path) -> std::io::Result<()> {
        Self::set_mode(dir, DIR_MODE)?;
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                Self::apply_recursive(&path)?;
            } else {
                Self::set_mode(&path, FILE_MODE)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Stage for PermissionsStage {
    fn name(&self) -> &str {
        "permissions"
    }

    async fn execute(&self, _bag: &Bag) -> Result<(), StageError> {
        let result = match &self.target {
            PermissionsTarget::Directory(dir) => Self::apply_recursive(dir),
            PermissionsTarget::File(file) => Self::set_mode(file, FILE_MODE),
        };
        result.map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))
    }
}

#[cfg(test)]
#[path = "permissions_tests.rs"]
mod tests;
