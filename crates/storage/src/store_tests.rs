// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgmoneta_core::BackupConfig;

fn backup_with(label: &str) -> Backup {
    Backup::new(BackupConfig {
        label: label.to_string(),
        major_version: 16,
        hash_algorithm: "sha256".into(),
        starting_wal_segment: "000000010000000000000001".into(),
        wal_segment_delta: None,
    })
}

#[test]
fn no_backup_directory_yields_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let backups = get_backups(dir.path()).unwrap();
    assert!(backups.is_empty());
}

#[test]
fn get_backups_returns_sorted_by_label_ascending() {
    let dir = tempfile::tempdir().unwrap();
    write_backup(dir.path(), &backup_with("20260102000000")).unwrap();
    write_backup(dir.path(), &backup_with("20260101000000")).unwrap();

    let backups = get_backups(dir.path()).unwrap();
    let labels: Vec<_> = backups.iter().map(|b| b.label.clone()).collect();
    assert_eq!(labels, vec!["20260101000000", "20260102000000"]);
}

#[test]
fn non_label_directories_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    write_backup(dir.path(), &backup_with("20260101000000")).unwrap();
    std::fs::create_dir_all(backups_root(dir.path()).join("not-a-label")).unwrap();

    let backups = get_backups(dir.path()).unwrap();
    assert_eq!(backups.len(), 1);
}

#[test]
fn malformed_backup_info_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_backup(dir.path(), &backup_with("20260101000000")).unwrap();

    let broken_dir = backup_dir(dir.path(), "20260102000000");
    std::fs::create_dir_all(&broken_dir).unwrap();
    std::fs::write(broken_dir.join("backup.info"), "NOT_KV\n").unwrap();

    let backups = get_backups(dir.path()).unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].label, "20260101000000");
}

#[test]
fn write_then_read_then_delete_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let backup = backup_with("20260101000000");
    write_backup(dir.path(), &backup).unwrap();

    let read = read_backup(dir.path(), "20260101000000").unwrap();
    assert_eq!(read.label, backup.label);

    delete_backup(dir.path(), "20260101000000").unwrap();
    assert!(!backup_dir(dir.path(), "20260101000000").exists());
    assert!(get_backups(dir.path()).unwrap().is_empty());
}
