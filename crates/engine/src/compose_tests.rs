// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgmoneta_adapters::compress::ZstdCompressor;
use pgmoneta_adapters::encrypt::NoOpEncryptor;
use pgmoneta_core::bag::Value;
use pgmoneta_core::server::Server;
use std::path::PathBuf;

fn server(root: &std::path::Path) -> Server {
    Server {
        name: "primary".to_string(),
        host: "127.0.0.1".to_string(),
        port: 5432,
        valid: true,
        wal_streaming: true,
        wal_segment_size: 16 * 1024 * 1024,
        workers: None,
        hash_algorithm: None,
        cluster_member: false,
        backup_root: root.to_path_buf(),
        wal_root: root.join("wal"),
    }
}

#[test]
fn backup_workflow_orders_stages_and_seeds_size_keys() {
    let dir = tempfile::tempdir().unwrap();
    let (workflow, bag) = compose_workflow(Operation::Backup {
        server: server(dir.path()),
        label: "20260727000000".to_string(),
        worker_count: 2,
        hash_algorithm: HashAlgorithm::Sha256,
        predecessor: None,
        compressor: Arc::new(ZstdCompressor::default()),
        encryptor: Arc::new(NoOpEncryptor),
    });

    assert_eq!(
        workflow.stage_names(),
        vec!["compress", "encrypt", "hash", "link", "permissions", "local_storage"]
    );
    assert!(matches!(bag.get("backup_size"), Some(Value::UInt(0))));
    assert!(matches!(bag.get("file_count"), Some(Value::UInt(0))));
    assert!(matches!(bag.get("restore_size"), Some(Value::UInt(0))));
}

#[test]
fn backup_workflow_carries_a_predecessor_into_the_link_stage() {
    let dir = tempfile::tempdir().unwrap();
    let (workflow, _bag) = compose_workflow(Operation::Backup {
        server: server(dir.path()),
        label: "20260727000000".to_string(),
        worker_count: 2,
        hash_algorithm: HashAlgorithm::Sha256,
        predecessor: Some(BackupPredecessor {
            manifest_path: dir.path().join("prev.manifest"),
            data_dir: dir.path().join("prev/data"),
        }),
        compressor: Arc::new(ZstdCompressor::default()),
        encryptor: Arc::new(NoOpEncryptor),
    });

    assert_eq!(workflow.len(), 6);
}

#[test]
fn verify_workflow_seeds_failed_and_optionally_all() {
    let dir = tempfile::tempdir().unwrap();
    let (workflow, bag) = compose_workflow(Operation::Verify {
        manifest_path: dir.path().join("backup.manifest"),
        data_dir: dir.path().join("data"),
        algorithm: HashAlgorithm::Sha256,
        worker_count: 2,
        include_all: true,
    });

    assert_eq!(workflow.stage_names(), vec!["verify"]);
    assert!(matches!(bag.get("failed"), Some(Value::Deque(_))));
    assert!(matches!(bag.get("all"), Some(Value::Deque(_))));
}

#[test]
fn verify_workflow_without_include_all_does_not_seed_all() {
    let dir = tempfile::tempdir().unwrap();
    let (_workflow, bag) = compose_workflow(Operation::Verify {
        manifest_path: dir.path().join("backup.manifest"),
        data_dir: dir.path().join("data"),
        algorithm: HashAlgorithm::Sha256,
        worker_count: 2,
        include_all: false,
    });

    assert!(bag.get("all").is_none());
}

#[test]
fn restore_workflow_cleans_up_then_fixes_permissions() {
    let (workflow, _bag) = compose_workflow(Operation::Restore {
        target_dir: PathBuf::from("/tmp/pgmoneta-restore"),
    });

    assert_eq!(workflow.stage_names(), vec!["cleanup", "permissions"]);
}

#[test]
fn archive_workflow_bundles_then_fixes_permissions() {
    let (workflow, _bag) = compose_workflow(Operation::Archive {
        data_dir: PathBuf::from("/tmp/pgmoneta-archive/data"),
        output_path: PathBuf::from("/tmp/pgmoneta-archive/out.tar.zst"),
        compressor: Arc::new(ZstdCompressor::default()),
    });

    assert_eq!(workflow.stage_names(), vec!["archive", "permissions"]);
}

#[test]
fn retention_workflow_is_a_single_stage() {
    let (workflow, _bag) = compose_workflow(Operation::Retention {
        server_root: PathBuf::from("/tmp/pgmoneta-retention"),
        policy: RetentionPolicy::default(),
        now: chrono::Local::now(),
    });

    assert_eq!(workflow.stage_names(), vec!["retention"]);
}
