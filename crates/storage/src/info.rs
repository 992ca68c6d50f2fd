// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `backup.info`: a line-oriented `KEY=value` file recording everything
//! about one backup that isn't in its manifest.
//!
//! Parsed by hand with a `BufReader`, the same line-oriented style as
//! `Wal::scan_wal`, rather than pulling in a dedicated key=value crate
//! for a format this small. Unknown keys are kept (not dropped) so a
//! reader written against an older key set still round-trips files
//! written by a newer one.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

use pgmoneta_core::{Backup, BackupConfig, Validity};

pub const KEY_BACKUP: &str = "BACKUP";
pub const KEY_ELAPSED: &str = "ELAPSED";
pub const KEY_LINKING_ELAPSED: &str = "LINKING_ELAPSED";
pub const KEY_KEEP: &str = "KEEP";
pub const KEY_VALID: &str = "VALID";
pub const KEY_WAL: &str = "WAL";
pub const KEY_DELTA: &str = "DELTA";
pub const KEY_HASH_ALGORITHM: &str = "HASH_ALGORITHM";
pub const KEY_MAJOR_VERSION: &str = "MAJOR_VERSION";
pub const KEY_COMMENTS: &str = "COMMENTS";
pub const KEY_RESTORE_SIZE: &str = "RESTORE_SIZE";

#[derive(Debug, Error)]
pub enum InfoError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed line {line}: {raw:?}")]
    Malformed { line: usize, raw: String },
    #[error("missing required key {0}")]
    MissingKey(&'static str),
}

/// An in-memory `backup.info` file: known keys stay typed on [`Backup`],
/// everything else (including keys this build doesn't recognize) rides
/// along in an ordered side table so it survives a read-modify-write.
#[derive(Debug, Clone, Default)]
pub struct InfoFile {
    raw: BTreeMap<String, String>,
}

impl InfoFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(path: &Path) -> Result<Self, InfoError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut raw = BTreeMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match trimmed.split_once('=') {
                Some((k, v)) => {
                    raw.insert(k.to_string(), v.to_string());
                }
                None => {
                    return Err(InfoError::Malformed {
                        line: i + 1,
                        raw: line,
                    });
                }
            }
        }

        Ok(Self { raw })
    }

    pub fn write(&self, path: &Path) -> Result<(), InfoError> {
        let mut file = File::create(path)?;
        for (k, v) in &self.raw {
            writeln!(file, "{k}={v}")?;
        }
        file.sync_all()?;
        Ok(())
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.raw.get(key).map(String::as_str)
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.raw.insert(key.to_string(), value.into());
    }

    pub fn get_unsigned_long(&self, key: &str) -> Option<u64> {
        self.raw.get(key).and_then(|v| v.parse().ok())
    }

    pub fn set_unsigned_long(&mut self, key: &str, value: u64) {
        self.set_string(key, value.to_string());
    }

    pub fn get_double(&self, key: &str) -> Option<f64> {
        self.raw.get(key).and_then(|v| v.parse().ok())
    }

    pub fn set_double(&mut self, key: &str, value: f64) {
        self.set_string(key, value.to_string());
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.raw.get(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_string(key, if value { "1" } else { "0" });
    }

    /// Build a typed [`Backup`] from this file's known keys.
    pub fn to_backup(&self, label: &str) -> Result<Backup, InfoError> {
        let major_version = self
            .get_unsigned_long(KEY_MAJOR_VERSION)
            .ok_or(InfoError::MissingKey(KEY_MAJOR_VERSION))? as u32;
        let hash_algorithm = self
            .get_string(KEY_HASH_ALGORITHM)
            .ok_or(InfoError::MissingKey(KEY_HASH_ALGORITHM))?
            .to_string();
        let starting_wal_segment = self.get_string(KEY_WAL).unwrap_or_default().to_string();
        let wal_segment_delta = self.get_unsigned_long(KEY_DELTA);

        let mut backup = Backup::new(BackupConfig {
            label: label.to_string(),
            major_version,
            hash_algorithm,
            starting_wal_segment,
            wal_segment_delta,
        });
        backup.validity = match self.get_bool(KEY_VALID) {
            Some(true) => Validity::Valid,
            Some(false) => Validity::Invalid,
            None => Validity::Unknown,
        };
        backup.keep = self.get_bool(KEY_KEEP).unwrap_or(false);
        backup.backup_size = self.get_unsigned_long(KEY_BACKUP).unwrap_or(0);
        backup.restore_size = self.get_unsigned_long(KEY_RESTORE_SIZE).unwrap_or(0);
        backup.elapsed_seconds = self.get_double(KEY_ELAPSED).unwrap_or(0.0);
        backup.linking_elapsed_seconds = self.get_double(KEY_LINKING_ELAPSED);
        backup.comments = self.get_string(KEY_COMMENTS).map(str::to_string);

        Ok(backup)
    }

    /// Populate this file's known keys from a typed [`Backup`].
    pub fn from_backup(backup: &Backup) -> Self {
        let mut info = Self::new();
        info.set_unsigned_long(KEY_MAJOR_VERSION, backup.major_version as u64);
        info.set_string(KEY_HASH_ALGORITHM, backup.hash_algorithm.clone());
        info.set_string(KEY_WAL, backup.starting_wal_segment.clone());
        if let Some(delta) = backup.wal_segment_delta {
            info.set_unsigned_long(KEY_DELTA, delta);
        }
        info.set_bool(KEY_VALID, backup.validity.is_valid());
        info.set_bool(KEY_KEEP, backup.keep);
        info.set_unsigned_long(KEY_BACKUP, backup.backup_size);
        info.set_unsigned_long(KEY_RESTORE_SIZE, backup.restore_size);
        info.set_double(KEY_ELAPSED, backup.elapsed_seconds);
        if let Some(linking) = backup.linking_elapsed_seconds {
            info.set_double(KEY_LINKING_ELAPSED, linking);
        }
        if let Some(comments) = &backup.comments {
            info.set_string(KEY_COMMENTS, comments.clone());
        }
        info
    }
}

#[cfg(test)]
#[path = "info_tests.rs"]
mod tests;
