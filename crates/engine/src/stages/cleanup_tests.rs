// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn removes_files_matching_default_suffixes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("backup_label.old"), b"stale").unwrap();
    std::fs::write(dir.path().join("keep.dat"), b"fresh").unwrap();

    CleanupStage::new(dir.path()).execute(&Bag::new(false)).await.unwrap();

    assert!(!dir.path().join("backup_label.old").exists());
    assert!(dir.path().join("keep.dat").exists());
}

#[tokio::test]
async fn removes_directories_matching_a_suffix_too() {
    let dir = tempfile::tempdir().unwrap();
    let stale_dir = dir.path().join("pg_wal.tmp");
    std::fs::create_dir_all(&stale_dir).unwrap();
    std::fs::write(stale_dir.join("segment"), b"x").unwrap();

    CleanupStage::new(dir.path()).execute(&Bag::new(false)).await.unwrap();

    assert!(!stale_dir.exists());
}

#[tokio::test]
async fn missing_directory_is_a_no_op() {
    let missing = std::path::Path::new("/nonexistent/pgmoneta/cleanup");
    CleanupStage::new(missing).execute(&Bag::new(false)).await.unwrap();
}

#[tokio::test]
async fn custom_suffixes_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("leftover.bak"), b"x").unwrap();
    std::fs::write(dir.path().join("leftover.old"), b"x").unwrap();

    CleanupStage::with_suffixes(dir.path(), vec![".bak".to_string()])
        .execute(&Bag::new(false))
        .await
        .unwrap();

    assert!(!dir.path().join("leftover.bak").exists());
    assert!(dir.path().join("leftover.old").exists());
}
