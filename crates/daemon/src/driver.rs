// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation drivers: one function per command, each acquiring the
//! server's gate for its [`OperationKind`], composing and running a
//! workflow, and translating the outcome into a [`Response`].
//!
//! This is the layer kept between the wire protocol and the engine: the
//! driver owns gate acquisition, backup bookkeeping (`backup.info`
//! reads/writes, predecessor selection), and error-to-response
//! translation; the engine crate stays ignorant of both the protocol
//! and the on-disk metadata store.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pgmoneta_adapters::compress::{Compressor, ZstdCompressor};
use pgmoneta_adapters::encrypt::{Encryptor, NoOpEncryptor};
use pgmoneta_adapters::hash::HashAlgorithm;
use pgmoneta_core::backup::{Backup, BackupConfig, Validity};
use pgmoneta_core::config::{ConfigError, Configuration};
use pgmoneta_core::gate::OperationKind;
use pgmoneta_core::workflow::Driver as WorkflowDriver;
use pgmoneta_engine::stages::retention::RetentionPolicy;
use pgmoneta_engine::{BackupPredecessor, Operation, compose_workflow};
use pgmoneta_storage::store;

use crate::protocol::{BackupSummary, Response, VerifyScope};

/// The result of running one command: the response to send back, and
/// whether the underlying operation succeeded (used by the caller to
/// build the enclosing [`crate::protocol::Outcome`]).
pub struct DriverOutcome {
    pub success: bool,
    pub response: Response,
}

impl DriverOutcome {
    fn ok(response: Response) -> Self {
        Self { success: true, response }
    }

    fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            response: Response::Error {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

fn to_summary(backup: &Backup) -> BackupSummary {
    BackupSummary {
        label: backup.label.clone(),
        validity: backup.validity,
        keep: backup.keep,
        backup_size: backup.backup_size,
        restore_size: backup.restore_size,
        elapsed_seconds: backup.elapsed_seconds,
        linking_elapsed_seconds: backup.linking_elapsed_seconds,
        comments: backup.comments.clone(),
        wal: backup.starting_wal_segment.clone(),
        delta: backup.wal_segment_delta,
    }
}

/// The newest valid backup with a matching major version, if any — the
/// predecessor a new incremental backup links against.
fn select_predecessor(backups: &[Backup], major_version: u32) -> Option<&Backup> {
    backups
        .iter()
        .rev()
        .find(|b| b.validity.is_valid() && b.major_version == major_version)
}

/// The newest WAL segment file name under `wal_root`, or a zeroed
/// segment name if none has been archived yet. WAL streaming itself is
/// out of scope; this only seeds `BackupConfig.starting_wal_segment`
/// with whatever has already landed on disk.
fn latest_wal_segment(wal_root: &std::path::Path) -> String {
    const INITIAL: &str = "000000010000000000000000";

    let Ok(entries) = std::fs::read_dir(wal_root) else {
        return INITIAL.to_string();
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.len() == 24 && name.bytes().all(|b| b.is_ascii_hexdigit()))
        .collect();
    names.sort();
    names.pop().unwrap_or_else(|| INITIAL.to_string())
}

fn config_error_response(err: ConfigError) -> DriverOutcome {
    DriverOutcome::err("UNKNOWN_SERVER", err.to_string())
}

/// Every operation requires a valid server; backup additionally requires
/// active WAL streaming. Returns the failing outcome, or `None` if the
/// server is ready.
fn check_server_ready(server: &pgmoneta_core::server::Server, require_wal_streaming: bool) -> Option<DriverOutcome> {
    if !server.valid {
        return Some(DriverOutcome::err("SERVER_INVALID", format!("server {} is not valid", server.name)));
    }
    if require_wal_streaming && !server.wal_streaming {
        return Some(DriverOutcome::err(
            "WAL_STREAMING_INACTIVE",
            format!("server {} has no active WAL streaming", server.name),
        ));
    }
    None
}

pub async fn ping() -> DriverOutcome {
    DriverOutcome::ok(Response::Pong)
}

pub async fn backup(config: &Configuration, server_name: &str, major_version: u32) -> DriverOutcome {
    let server = match config.server(server_name) {
        Ok(s) => s.clone(),
        Err(e) => return config_error_response(e),
    };
    if let Some(out) = check_server_ready(&server, true) {
        return out;
    }
    let gate = match config.gate(server_name) {
        Ok(g) => g,
        Err(e) => return config_error_response(e),
    };
    let _guard = match gate.acquire(OperationKind::Backup) {
        Ok(g) => g,
        Err(e) => return DriverOutcome::err("BACKUP_ACTIVE", e.to_string()),
    };

    let existing = match store::get_backups(server.backup_root()) {
        Ok(b) => b,
        Err(e) => return DriverOutcome::err("STORAGE_ERROR", e.to_string()),
    };
    let predecessor = select_predecessor(&existing, major_version).map(|p| BackupPredecessor {
        manifest_path: store::manifest_path(server.backup_root(), &p.label),
        data_dir: server.backup_dir(&p.label).join("data"),
    });

    let label = pgmoneta_core::backup::generate_label(chrono::Local::now());
    let hash_algorithm_name = config.hash_algorithm(&server);
    let hash_algorithm = match HashAlgorithm::parse(&hash_algorithm_name) {
        Ok(a) => a,
        Err(e) => return DriverOutcome::err("BAD_CONFIG", e.to_string()),
    };
    let worker_count = config.worker_count(&server);
    let starting_wal_segment = latest_wal_segment(server.wal_root());
    let wal_segment_delta = select_predecessor(&existing, major_version)
        .and_then(|p| pgmoneta_core::backup::wal_segment_delta(&p.starting_wal_segment, &starting_wal_segment));

    let mut record = Backup::new(BackupConfig {
        label: label.clone(),
        major_version,
        hash_algorithm: hash_algorithm_name,
        starting_wal_segment,
        wal_segment_delta,
    });

    let data_dir = server.backup_dir(&label).join("data");
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        return DriverOutcome::err("STORAGE_ERROR", e.to_string());
    }

    let compressor: Arc<dyn Compressor> = Arc::new(ZstdCompressor::new(3));
    let encryptor: Arc<dyn Encryptor> = Arc::new(NoOpEncryptor);

    let (workflow, bag) = compose_workflow(Operation::Backup {
        server: server.clone(),
        label: label.clone(),
        worker_count,
        hash_algorithm,
        predecessor,
        compressor,
        encryptor,
    });

    let started = Instant::now();
    let run_result = WorkflowDriver::run(&workflow, &bag).await;
    record.elapsed_seconds = started.elapsed().as_secs_f64();

    record.validity = if run_result.is_ok() { Validity::Valid } else { Validity::Invalid };
    if let Some(pgmoneta_core::bag::Value::UInt(size)) = bag.get("backup_size") {
        record.backup_size = size;
    }
    if let Some(pgmoneta_core::bag::Value::UInt(size)) = bag.get("restore_size") {
        record.restore_size = size;
    }

    if let Err(e) = store::write_backup(server.backup_root(), &record) {
        return DriverOutcome::err("STORAGE_ERROR", e.to_string());
    }

    match run_result {
        Ok(()) => DriverOutcome::ok(Response::BackupStarted {
            server: server_name.to_string(),
            label,
        }),
        Err(e) => DriverOutcome::err("BACKUP_FAILED", e.to_string()),
    }
}

pub async fn list(config: &Configuration, server_name: &str) -> DriverOutcome {
    let server = match config.server(server_name) {
        Ok(s) => s,
        Err(e) => return config_error_response(e),
    };
    match store::get_backups(server.backup_root()) {
        Ok(backups) => DriverOutcome::ok(Response::Backups {
            server: server_name.to_string(),
            backups: backups.iter().map(to_summary).collect(),
        }),
        Err(e) => DriverOutcome::err("STORAGE_ERROR", e.to_string()),
    }
}

pub async fn delete(config: &Configuration, server_name: &str, label: &str) -> DriverOutcome {
    let server = match config.server(server_name) {
        Ok(s) => s,
        Err(e) => return config_error_response(e),
    };
    if let Some(out) = check_server_ready(server, false) {
        return out;
    }
    let gate = match config.gate(server_name) {
        Ok(g) => g,
        Err(e) => return config_error_response(e),
    };
    let _guard = match gate.acquire(OperationKind::Delete) {
        Ok(g) => g,
        Err(e) => return DriverOutcome::err("DELETE_ACTIVE", e.to_string()),
    };

    if store::read_backup(server.backup_root(), label).is_err() {
        return DriverOutcome::err("UNKNOWN_BACKUP", format!("no such backup: {label}"));
    }

    match store::delete_backup(server.backup_root(), label) {
        Ok(()) => DriverOutcome::ok(Response::Deleted {
            server: server_name.to_string(),
            label: label.to_string(),
        }),
        Err(e) => DriverOutcome::err("STORAGE_ERROR", e.to_string()),
    }
}

pub async fn restore(config: &Configuration, server_name: &str, label: &str, target_dir: PathBuf) -> DriverOutcome {
    let server = match config.server(server_name) {
        Ok(s) => s,
        Err(e) => return config_error_response(e),
    };
    if let Some(out) = check_server_ready(server, false) {
        return out;
    }
    let gate = match config.gate(server_name) {
        Ok(g) => g,
        Err(e) => return config_error_response(e),
    };
    let _guard = match gate.acquire(OperationKind::Restore) {
        Ok(g) => g,
        Err(e) => return DriverOutcome::err("RESTORE_ACTIVE", e.to_string()),
    };

    let backup = match store::read_backup(server.backup_root(), label) {
        Ok(b) => b,
        Err(_) => return DriverOutcome::err("UNKNOWN_BACKUP", format!("no such backup: {label}")),
    };
    if !backup.validity.is_valid() {
        return DriverOutcome::err("INVALID_BACKUP", format!("backup {label} is not valid"));
    }

    let data_dir = server.backup_dir(label).join("data");
    if let Err(e) = copy_tree(&data_dir, &target_dir) {
        return DriverOutcome::err("RESTORE_FAILED", e.to_string());
    }

    let (workflow, bag) = compose_workflow(Operation::Restore {
        target_dir: target_dir.clone(),
    });
    match WorkflowDriver::run(&workflow, &bag).await {
        Ok(()) => DriverOutcome::ok(Response::Restored {
            server: server_name.to_string(),
            label: label.to_string(),
            target_dir,
        }),
        Err(e) => DriverOutcome::err("RESTORE_FAILED", e.to_string()),
    }
}

/// Recursively copies `src` onto `dst`, creating directories as needed.
/// `CleanupStage` (in the composed restore workflow) is responsible for
/// removing anything already present at `dst` before this runs.
fn copy_tree(src: &std::path::Path, dst: &std::path::Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            std::fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

pub async fn verify(config: &Configuration, server_name: &str, label: &str, files: VerifyScope) -> DriverOutcome {
    let server = match config.server(server_name) {
        Ok(s) => s,
        Err(e) => return config_error_response(e),
    };
    if let Some(out) = check_server_ready(server, false) {
        return out;
    }
    let gate = match config.gate(server_name) {
        Ok(g) => g,
        Err(e) => return config_error_response(e),
    };
    let _guard = match gate.acquire(OperationKind::Verify) {
        Ok(g) => g,
        Err(e) => return DriverOutcome::err("VERIFY_ACTIVE", e.to_string()),
    };

    let backup = match store::read_backup(server.backup_root(), label) {
        Ok(b) => b,
        Err(_) => return DriverOutcome::err("UNKNOWN_BACKUP", format!("no such backup: {label}")),
    };
    let algorithm = match HashAlgorithm::parse(&backup.hash_algorithm) {
        Ok(a) => a,
        Err(e) => return DriverOutcome::err("BAD_CONFIG", e.to_string()),
    };

    let manifest_path = store::manifest_path(server.backup_root(), label);
    let data_dir = server.backup_dir(label).join("data");
    let include_all = matches!(files, VerifyScope::All);

    let (workflow, bag) = compose_workflow(Operation::Verify {
        manifest_path,
        data_dir,
        algorithm,
        worker_count: config.worker_count(server),
        include_all,
    });

    if let Err(e) = WorkflowDriver::run(&workflow, &bag).await {
        return DriverOutcome::err("VERIFY_FAILED", e.to_string());
    }

    let failed = bag
        .get("failed")
        .and_then(|v| v.as_deque().cloned())
        .map(|d| d.into_iter().collect())
        .unwrap_or_default();
    let all = if include_all {
        bag.get("all").and_then(|v| v.as_deque().cloned()).map(|d| d.into_iter().collect())
    } else {
        None
    };

    DriverOutcome::ok(Response::Verified {
        server: server_name.to_string(),
        label: label.to_string(),
        failed,
        all,
    })
}

pub async fn archive(config: &Configuration, server_name: &str, label: &str, output_path: PathBuf) -> DriverOutcome {
    let server = match config.server(server_name) {
        Ok(s) => s,
        Err(e) => return config_error_response(e),
    };
    if let Some(out) = check_server_ready(server, false) {
        return out;
    }
    let gate = match config.gate(server_name) {
        Ok(g) => g,
        Err(e) => return config_error_response(e),
    };
    let _guard = match gate.acquire(OperationKind::Archive) {
        Ok(g) => g,
        Err(e) => return DriverOutcome::err("ARCHIVE_ACTIVE", e.to_string()),
    };

    if store::read_backup(server.backup_root(), label).is_err() {
        return DriverOutcome::err("UNKNOWN_BACKUP", format!("no such backup: {label}"));
    }

    let data_dir = server.backup_dir(label).join("data");
    let compressor: Arc<dyn Compressor> = Arc::new(ZstdCompressor::new(3));

    let (workflow, bag) = compose_workflow(Operation::Archive {
        data_dir,
        output_path: output_path.clone(),
        compressor,
    });

    match WorkflowDriver::run(&workflow, &bag).await {
        Ok(()) => DriverOutcome::ok(Response::Archived {
            server: server_name.to_string(),
            label: label.to_string(),
            output_path,
        }),
        Err(e) => DriverOutcome::err("ARCHIVE_FAILED", e.to_string()),
    }
}

pub async fn retention(config: &Configuration, server_name: &str) -> DriverOutcome {
    let server = match config.server(server_name) {
        Ok(s) => s,
        Err(e) => return config_error_response(e),
    };
    if let Some(out) = check_server_ready(server, false) {
        return out;
    }
    let gate = match config.gate(server_name) {
        Ok(g) => g,
        Err(e) => return config_error_response(e),
    };
    let _guard = match gate.acquire(OperationKind::Retention) {
        Ok(g) => g,
        Err(e) => return DriverOutcome::err("RETENTION_ACTIVE", e.to_string()),
    };

    let policy = RetentionPolicy {
        count: config.retention_count,
        duration: config.retention_days.map(chrono::Duration::days),
    };

    let (workflow, bag) = compose_workflow(Operation::Retention {
        server_root: server.backup_root().to_path_buf(),
        policy,
        now: chrono::Local::now(),
    });

    if let Err(e) = WorkflowDriver::run(&workflow, &bag).await {
        return DriverOutcome::err("RETENTION_FAILED", e.to_string());
    }

    let removed = bag
        .get("removed")
        .and_then(|v| v.as_deque().cloned())
        .map(|d| d.into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    DriverOutcome::ok(Response::RetentionApplied {
        server: server_name.to_string(),
        removed,
    })
}

/// `Duration` helper shared by the supervisor for logging request
/// latency alongside the `Outcome` it builds.
pub fn elapsed_since(started: Instant) -> Duration {
    started.elapsed()
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
