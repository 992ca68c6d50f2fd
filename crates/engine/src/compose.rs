// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the stage chain for each operation kind and the context bag it
//! runs against.
//!
//! A stage only ever sees `&Bag` (never `&mut Bag`): `Bag::with_mut`
//! mutates an existing entry but cannot insert one. So every well-known
//! key a composed chain's stages might publish into is seeded here,
//! before the workflow runs, on a thread-safe bag (worker-pool jobs in
//! `VerifyStage`/`LinkStage` write into it from spawned tasks).

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use pgmoneta_adapters::compress::Compressor;
use pgmoneta_adapters::encrypt::Encryptor;
use pgmoneta_adapters::hash::HashAlgorithm;
use pgmoneta_core::bag::{Bag, Value};
use pgmoneta_core::server::Server;
use pgmoneta_core::workflow::Workflow;
use pgmoneta_storage::store;

use crate::stages::link::Predecessor;
use crate::stages::{
    ArchiveStage, CleanupStage, CompressStage, EncryptStage, HashStage, LinkStage, LocalStorageStage, PermissionsStage,
    RetentionPolicy, RetentionStage, VerifyStage,
};

/// The newest valid predecessor of the backup about to be taken, if any
/// — resolved by the caller (it needs `get_backups` plus validity and
/// major-version filtering, which belong to the daemon's driver, not
/// the composer).
pub struct BackupPredecessor {
    pub manifest_path: PathBuf,
    pub data_dir: PathBuf,
}

/// Everything the composer needs to build a workflow for one operation.
/// One variant per operation kind named in the gate's `OperationKind`,
/// plus the supplemented sweep operation, retention.
pub enum Operation {
    Backup {
        server: Server,
        label: String,
        worker_count: usize,
        hash_algorithm: HashAlgorithm,
        predecessor: Option<BackupPredecessor>,
        compressor: Arc<dyn Compressor>,
        encryptor: Arc<dyn Encryptor>,
    },
    Restore {
        target_dir: PathBuf,
    },
    Verify {
        manifest_path: PathBuf,
        data_dir: PathBuf,
        algorithm: HashAlgorithm,
        worker_count: usize,
        include_all: bool,
    },
    Archive {
        data_dir: PathBuf,
        output_path: PathBuf,
        compressor: Arc<dyn Compressor>,
    },
    Retention {
        server_root: PathBuf,
        policy: RetentionPolicy,
        now: chrono::DateTime<chrono::Local>,
    },
}

/// Build the workflow and seeded bag for `operation`.
pub fn compose_workflow(operation: Operation) -> (Workflow, Bag) {
    let mut bag = Bag::new(true);

    let stages: Vec<Box<dyn pgmoneta_core::workflow::Stage>> = match operation {
        Operation::Backup {
            server,
            label,
            worker_count,
            hash_algorithm,
            predecessor,
            compressor,
            encryptor,
        } => {
            let backup_dir = server.backup_dir(&label);
            let data_dir = backup_dir.join("data");
            let manifest_path = store::manifest_path(server.backup_root(), &label);
            let info_path = store::info_path(server.backup_root(), &label);

            bag.add("backup_size", Value::UInt(0));
            bag.add("file_count", Value::UInt(0));
            bag.add("restore_size", Value::UInt(0));

            let link_predecessor = predecessor.map(|p| Predecessor {
                manifest_path: p.manifest_path,
                data_dir: p.data_dir,
            });

            vec![
                Box::new(CompressStage::new(&data_dir, compressor)),
                Box::new(EncryptStage::new(&data_dir, encryptor)),
                Box::new(HashStage::new(&data_dir, &manifest_path, hash_algorithm)),
                Box::new(LinkStage::new(
                    &manifest_path,
                    &data_dir,
                    link_predecessor,
                    &info_path,
                    worker_count,
                )),
                Box::new(PermissionsStage::for_directory(&backup_dir)),
                Box::new(LocalStorageStage::new(label)),
            ]
        }

        Operation::Restore { target_dir } => {
            vec![
                Box::new(CleanupStage::new(&target_dir)),
                Box::new(PermissionsStage::for_directory(&target_dir)),
            ]
        }

        Operation::Verify {
            manifest_path,
            data_dir,
            algorithm,
            worker_count,
            include_all,
        } => {
            bag.add("failed", Value::Deque(VecDeque::new()));
            if include_all {
                bag.add("all", Value::Deque(VecDeque::new()));
            }

            vec![Box::new(VerifyStage::new(
                manifest_path,
                data_dir,
                algorithm,
                worker_count,
                include_all,
            ))]
        }

        Operation::Archive {
            data_dir,
            output_path,
            compressor,
        } => {
            vec![
                Box::new(ArchiveStage::new(data_dir, &output_path, compressor)),
                Box::new(PermissionsStage::for_file(&output_path)),
            ]
        }

        Operation::Retention { server_root, policy, now } => {
            bag.add("removed", Value::Deque(VecDeque::new()));
            vec![Box::new(RetentionStage::new(server_root, policy, now))]
        }
    };

    (Workflow::new(stages), bag)
}

#[cfg(test)]
#[path = "compose_tests.rs"]
mod tests;
