//! Test helpers for black-box behavioral specifications.
//!
//! Spawns a real `pgmonetad` against an isolated config/socket/data tree
//! and drives it with the real `pgmoneta` CLI binary, the way a human
//! operator would.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

pub const WAIT_MAX_MS: u64 = 3000;
const POLL_INTERVAL_MS: u64 = 10;

/// Returns the path to a binary, checking llvm-cov target directory first.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn daemon_binary() -> PathBuf {
    binary_path("pgmonetad")
}

pub fn cli_binary() -> PathBuf {
    binary_path("pgmoneta")
}

/// Poll a condition until it returns true or the timeout elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(POLL_INTERVAL_MS);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// An isolated cluster fixture: one configured server ("main") with its
/// own config file, socket, and backup/WAL roots, plus a running
/// `pgmonetad` pointed at them.
pub struct Cluster {
    root: tempfile::TempDir,
    daemon: Option<Child>,
}

impl Cluster {
    /// Start a daemon against a freshly generated single-server config
    /// with WAL streaming active, ready to take backups.
    pub fn start() -> Self {
        Self::start_with_server_toml("wal_streaming = true")
    }

    /// Start a daemon whose only server has WAL streaming inactive — for
    /// exercising the precondition backup enforces on top of the others.
    pub fn start_without_wal_streaming() -> Self {
        Self::start_with_server_toml("wal_streaming = false")
    }

    fn start_with_server_toml(extra_server_lines: &str) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let backup_root = root.path().join("backups");
        let wal_root = root.path().join("wal");
        std::fs::create_dir_all(&backup_root).unwrap();
        std::fs::create_dir_all(&wal_root).unwrap();

        let config_path = root.path().join("pgmoneta.toml");
        std::fs::write(
            &config_path,
            format!(
                r#"
workers = 2
hash_algorithm = "sha256"

[[server]]
name = "main"
host = "localhost"
port = 5432
backup_root = {backup_root:?}
wal_root = {wal_root:?}
{extra_server_lines}
"#
            ),
        )
        .unwrap();

        let socket_path = root.path().join("pgmoneta.sock");

        let daemon = Command::new(daemon_binary())
            .env("PGMONETA_CONFIG_PATH", &config_path)
            .env("PGMONETA_SOCKET_PATH", &socket_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("pgmonetad should spawn");

        let mut cluster = Self { root, daemon: Some(daemon) };

        let socket = cluster.socket_path();
        assert!(
            wait_for(WAIT_MAX_MS, || socket.exists()),
            "daemon never created its management socket"
        );
        cluster
    }

    pub fn socket_path(&self) -> PathBuf {
        self.root.path().join("pgmoneta.sock")
    }

    pub fn backup_root(&self) -> PathBuf {
        self.root.path().join("backups")
    }

    /// Build a `pgmoneta` client command wired to this cluster's socket.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::new(cli_binary());
        cmd.env("PGMONETA_SOCKET_PATH", self.socket_path());
        cmd
    }

    /// Run a `pgmoneta` subcommand and return its captured output.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cli().args(args).output().expect("pgmoneta should run")
    }
}

impl Drop for Cluster {
    fn drop(&mut self) {
        if let Some(mut child) = self.daemon.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

pub trait OutputExt {
    fn stdout_string(&self) -> String;
    fn stderr_string(&self) -> String;
}

impl OutputExt for Output {
    fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
