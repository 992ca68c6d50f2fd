// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup: a named snapshot produced by one `backup` run.
//!
//! Stored as a directory `<server_backup_root>/<label>/` containing
//! `data/`, `backup.info`, and `backup.manifest`. The struct here is the
//! in-memory record; reading/writing `backup.info` lives in
//! `pgmoneta-storage` (it needs filesystem access this crate doesn't
//! have).

use serde::{Deserialize, Serialize};

/// Validity tri-state for a backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
    Unknown,
    Invalid,
    Valid,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Configuration used to create a new [`Backup`] record before its
/// workflow has run (sizes and elapsed times are filled in afterwards).
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub label: String,
    pub major_version: u32,
    pub hash_algorithm: String,
    pub starting_wal_segment: String,
    /// Segment count since the predecessor backup, if one exists.
    pub wal_segment_delta: Option<u64>,
}

/// A named snapshot. Ordering between backups is by `label`
/// (lexicographic == chronological, since labels are `YYYYMMDDHHMMSS`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub label: String,
    pub validity: Validity,
    pub keep: bool,
    pub major_version: u32,
    /// On-disk compressed size, bytes.
    pub backup_size: u64,
    /// Expanded (restored) size, bytes.
    pub restore_size: u64,
    pub starting_wal_segment: String,
    /// Segment count since the predecessor backup, if one exists — the
    /// `Delta` response key, kept distinct from `Wal` (the absolute
    /// starting segment) rather than overloading one key for both.
    pub wal_segment_delta: Option<u64>,
    pub hash_algorithm: String,
    pub elapsed_seconds: f64,
    pub linking_elapsed_seconds: Option<f64>,
    pub comments: Option<String>,
}

impl Backup {
    pub fn new(config: BackupConfig) -> Self {
        Self {
            label: config.label,
            validity: Validity::Unknown,
            keep: false,
            major_version: config.major_version,
            backup_size: 0,
            restore_size: 0,
            starting_wal_segment: config.starting_wal_segment,
            wal_segment_delta: config.wal_segment_delta,
            hash_algorithm: config.hash_algorithm,
            elapsed_seconds: 0.0,
            linking_elapsed_seconds: None,
            comments: None,
        }
    }
}

/// Generate a backup label from the current local time: `YYYYMMDDHHMMSS`.
/// Lexicographic order of labels equals chronological order.
pub fn generate_label(now: chrono::DateTime<chrono::Local>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Parse a 24-hex-digit WAL segment name into a single monotonic counter
/// (timeline, log id, and segment number concatenated as one `u128`).
/// Good enough to diff two segment names for a count; not a timeline-aware
/// comparison.
pub fn parse_wal_segment(name: &str) -> Option<u128> {
    if name.len() != 24 || !name.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u128::from_str_radix(name, 16).ok()
}

/// Segment count between two WAL segment names, or `None` if either is
/// unparseable.
pub fn wal_segment_delta(from: &str, to: &str) -> Option<u64> {
    let from = parse_wal_segment(from)?;
    let to = parse_wal_segment(to)?;
    Some(to.saturating_sub(from).min(u64::MAX as u128) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn label_format_is_fourteen_digits() {
        let t = chrono::Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(generate_label(t), "20260102030405");
    }

    #[test]
    fn label_ordering_matches_chronological_ordering() {
        let earlier = generate_label(chrono::Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let later = generate_label(chrono::Local.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
        assert!(earlier < later);
    }

    #[test]
    fn new_backup_starts_unknown_and_unkept() {
        let b = Backup::new(BackupConfig {
            label: "20260101000000".into(),
            major_version: 16,
            hash_algorithm: "sha256".into(),
            starting_wal_segment: "000000010000000000000001".into(),
            wal_segment_delta: None,
        });
        assert_eq!(b.validity, Validity::Unknown);
        assert!(!b.keep);
    }

    #[test]
    fn wal_segment_delta_counts_segments_between_two_names() {
        let a = "000000010000000000000001";
        let b = "000000010000000000000005";
        assert_eq!(wal_segment_delta(a, b), Some(4));
    }

    #[test]
    fn wal_segment_delta_is_none_for_a_malformed_name() {
        assert_eq!(wal_segment_delta("not-hex", "000000010000000000000005"), None);
    }
}
