// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory layout for one server's backups, and `get_backups`: the
//! "materialize records from persisted files, skip and warn on malformed
//! entries" pattern applied to `backup.info`.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use pgmoneta_core::Backup;

use crate::info::{InfoError, InfoFile};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `<server_root>/backup/`
pub fn backups_root(server_root: &Path) -> PathBuf {
    server_root.join("backup")
}

/// `<server_root>/backup/<label>/`
pub fn backup_dir(server_root: &Path, label: &str) -> PathBuf {
    backups_root(server_root).join(label)
}

pub fn info_path(server_root: &Path, label: &str) -> PathBuf {
    backup_dir(server_root, label).join("backup.info")
}

pub fn manifest_path(server_root: &Path, label: &str) -> PathBuf {
    backup_dir(server_root, label).join("backup.manifest")
}

/// A backup label is fourteen ASCII digits (`YYYYMMDDHHMMSS`).
fn is_label(name: &str) -> bool {
    name.len() == 14 && name.bytes().all(|b| b.is_ascii_digit())
}

/// Enumerate every backup under `server_root`, sorted by label ascending
/// (lexicographic order on a fixed-width numeric label is chronological
/// order). Directories that aren't label-shaped are ignored; directories
/// that are label-shaped but whose `backup.info` is missing or malformed
/// are skipped with a warning rather than failing the whole call.
pub fn get_backups(server_root: &Path) -> Result<Vec<Backup>, StoreError> {
    let root = backups_root(server_root);
    if !root.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(&root).map_err(|source| StoreError::Io {
        path: root.clone(),
        source,
    })?;

    let mut labels = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_dir() && is_label(&name) {
            labels.push(name);
        }
    }
    labels.sort();

    let mut backups = Vec::with_capacity(labels.len());
    for label in labels {
        let path = info_path(server_root, &label);
        match InfoFile::open(&path).and_then(|info| info.to_backup(&label)) {
            Ok(backup) => backups.push(backup),
            Err(err) => {
                warn!(label = %label, error = %err, "skipping backup with unreadable backup.info");
            }
        }
    }

    Ok(backups)
}

/// Reads a single backup's `backup.info`, if present.
pub fn read_backup(server_root: &Path, label: &str) -> Result<Backup, InfoError> {
    InfoFile::open(&info_path(server_root, label))?.to_backup(label)
}

/// Writes (or overwrites) a backup's `backup.info`.
pub fn write_backup(server_root: &Path, backup: &Backup) -> Result<(), InfoError> {
    let dir = backup_dir(server_root, &backup.label);
    std::fs::create_dir_all(&dir)?;
    InfoFile::from_backup(backup).write(&info_path(server_root, &backup.label))
}

/// Removes a backup's entire directory tree.
pub fn delete_backup(server_root: &Path, label: &str) -> Result<(), StoreError> {
    let dir = backup_dir(server_root, label);
    std::fs::remove_dir_all(&dir).map_err(|source| StoreError::Io { path: dir, source })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
