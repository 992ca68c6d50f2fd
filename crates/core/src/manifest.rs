// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manifest: ordered `(relative_path, file_hash)` rows for a backup, and
//! the set-diff over two manifests that drives incremental linking.
//!
//! The on-disk format is `backup.manifest`: CSV with columns
//! `relative_path,hex_digest`, one row per file, no header, no quoting.
//! Reading streams row by row rather than buffering the whole file, the
//! same texture as `Wal::scan_wal`'s line-at-a-time `BufReader` loop.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed manifest row at line {line}: {raw}")]
    Malformed { line: usize, raw: String },
}

/// A single manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub hash: String,
}

/// Streaming reader over a `backup.manifest` CSV file.
pub struct ManifestReader {
    lines: std::io::Lines<BufReader<File>>,
    line_no: usize,
}

impl ManifestReader {
    pub fn open(path: &Path) -> Result<Self, ManifestError> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Read every row into memory, keyed by path (last row for a
    /// duplicate path wins).
    pub fn read_all(path: &Path) -> Result<BTreeMap<PathBuf, String>, ManifestError> {
        let mut reader = Self::open(path)?;
        let mut map = BTreeMap::new();
        while let Some(entry) = reader.next_entry()? {
            map.insert(entry.path, entry.hash);
        }
        Ok(map)
    }

    /// Parse the next row, or `None` at EOF.
    pub fn next_entry(&mut self) -> Result<Option<ManifestEntry>, ManifestError> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            let line = line?;
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let Some((path, hash)) = line.split_once(',') else {
                return Err(ManifestError::Malformed {
                    line: self.line_no,
                    raw: line,
                });
            };
            return Ok(Some(ManifestEntry {
                path: PathBuf::from(path),
                hash: hash.to_string(),
            }));
        }
    }
}

/// Appends rows to a `backup.manifest` file.
pub struct ManifestWriter {
    file: File,
}

impl ManifestWriter {
    pub fn create(path: &Path) -> Result<Self, ManifestError> {
        Ok(Self {
            file: File::create(path)?,
        })
    }

    pub fn write_entry(&mut self, path: &Path, hash: &str) -> Result<(), ManifestError> {
        writeln!(self.file, "{},{}", path.display(), hash)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ManifestError> {
        self.file.flush()?;
        Ok(())
    }
}

/// Result of comparing two manifests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// In `old`, not in `new`.
    pub deleted: BTreeMap<PathBuf, String>,
    /// In both, with a different digest.
    pub changed: BTreeMap<PathBuf, String>,
    /// In `new`, not in `old`.
    pub added: BTreeMap<PathBuf, String>,
}

impl Diff {
    /// Files present in both manifests with the same digest: candidates
    /// for hardlinking against the predecessor.
    pub fn is_link_candidate(&self, path: &Path) -> bool {
        !self.changed.contains_key(path) && !self.added.contains_key(path)
    }
}

/// Compare `old` and `new` manifests and produce `deleted`/`changed`/`added`.
pub fn diff(old: &BTreeMap<PathBuf, String>, new: &BTreeMap<PathBuf, String>) -> Diff {
    let mut result = Diff::default();

    for (path, hash) in old {
        match new.get(path) {
            None => {
                result.deleted.insert(path.clone(), hash.clone());
            }
            Some(new_hash) if new_hash != hash => {
                result.changed.insert(path.clone(), new_hash.clone());
            }
            Some(_) => {}
        }
    }

    for (path, hash) in new {
        if !old.contains_key(path) {
            result.added.insert(path.clone(), hash.clone());
        }
    }

    result
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
