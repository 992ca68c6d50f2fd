//! CLI-level error reporting: a daemon that isn't running, and malformed
//! arguments.

use std::process::Command;

use crate::prelude::cli_binary;

#[test]
fn the_cli_fails_fast_when_no_daemon_is_listening() {
    let socket_dir = tempfile::tempdir().unwrap();
    let socket_path = socket_dir.path().join("nonexistent.sock");

    let output = Command::new(cli_binary())
        .env("PGMONETA_SOCKET_PATH", &socket_path)
        .args(["ping"])
        .output()
        .expect("pgmoneta should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("daemon is not running"));
}

#[test]
fn a_missing_required_argument_is_a_usage_error() {
    let output = Command::new(cli_binary())
        .args(["backup"])
        .output()
        .expect("pgmoneta should run");

    assert!(!output.status.success());
}
