// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use pgmoneta_core::backup::{Backup, BackupConfig};
use pgmoneta_storage::store;

fn backup_at(label: &str, keep: bool) -> Backup {
    let mut backup = Backup::new(BackupConfig {
        label: label.to_string(),
        major_version: 17,
        hash_algorithm: "sha256".to_string(),
        starting_wal_segment: "000000010000000000000001".to_string(),
        wal_segment_delta: None,
    });
    backup.keep = keep;
    backup
}

fn now() -> chrono::DateTime<chrono::Local> {
    chrono::Local.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).single().unwrap()
}

#[tokio::test]
async fn no_policy_configured_deletes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    store::write_backup(dir.path(), &backup_at("20260101000000", false)).unwrap();

    let stage = RetentionStage::new(dir.path(), RetentionPolicy::default(), now());
    stage.execute(&Bag::new(false)).await.unwrap();

    assert_eq!(store::get_backups(dir.path()).unwrap().len(), 1);
}

#[tokio::test]
async fn keeps_last_n_and_deletes_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    for label in ["20260101000000", "20260102000000", "20260103000000", "20260104000000"] {
        store::write_backup(dir.path(), &backup_at(label, false)).unwrap();
    }

    let policy = RetentionPolicy { count: Some(2), duration: None };
    let stage = RetentionStage::new(dir.path(), policy, now());
    stage.execute(&Bag::new(false)).await.unwrap();

    let remaining: Vec<String> = store::get_backups(dir.path()).unwrap().into_iter().map(|b| b.label).collect();
    assert_eq!(remaining, vec!["20260103000000", "20260104000000"]);
}

#[tokio::test]
async fn keep_flag_survives_regardless_of_count() {
    let dir = tempfile::tempdir().unwrap();
    store::write_backup(dir.path(), &backup_at("20260101000000", true)).unwrap();
    store::write_backup(dir.path(), &backup_at("20260102000000", false)).unwrap();
    store::write_backup(dir.path(), &backup_at("20260103000000", false)).unwrap();

    let policy = RetentionPolicy { count: Some(1), duration: None };
    let stage = RetentionStage::new(dir.path(), policy, now());
    stage.execute(&Bag::new(false)).await.unwrap();

    let mut remaining: Vec<String> = store::get_backups(dir.path()).unwrap().into_iter().map(|b| b.label).collect();
    remaining.sort();
    assert_eq!(remaining, vec!["20260101000000", "20260103000000"]);
}

#[tokio::test]
async fn removed_labels_are_reported_in_the_bag() {
    let dir = tempfile::tempdir().unwrap();
    for label in ["20260101000000", "20260102000000", "20260103000000"] {
        store::write_backup(dir.path(), &backup_at(label, false)).unwrap();
    }

    let policy = RetentionPolicy { count: Some(1), duration: None };
    let stage = RetentionStage::new(dir.path(), policy, now());
    let mut bag = Bag::new(true);
    bag.add("removed", pgmoneta_core::bag::Value::Deque(Default::default()));
    stage.execute(&bag).await.unwrap();

    let removed = bag.get("removed").and_then(|v| v.as_deque().cloned()).unwrap();
    assert_eq!(removed.len(), 2);
    assert!(removed.contains(&serde_json::Value::String("20260101000000".into())));
    assert!(removed.contains(&serde_json::Value::String("20260102000000".into())));
}

#[tokio::test]
async fn duration_policy_keeps_backups_within_window() {
    let dir = tempfile::tempdir().unwrap();
    store::write_backup(dir.path(), &backup_at("20260101000000", false)).unwrap();
    store::write_backup(dir.path(), &backup_at("20260726000000", false)).unwrap();

    let policy = RetentionPolicy { count: None, duration: Some(chrono::Duration::days(7)) };
    let stage = RetentionStage::new(dir.path(), policy, now());
    stage.execute(&Bag::new(false)).await.unwrap();

    let remaining: Vec<String> = store::get_backups(dir.path()).unwrap().into_iter().map(|b| b.label).collect();
    assert_eq!(remaining, vec!["20260726000000"]);
}
