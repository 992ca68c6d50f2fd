//! End-to-end backup lifecycle: take a backup, see it listed, verify it,
//! then archive it.

use serde_json::Value;

use crate::prelude::{Cluster, OutputExt};

fn backup_label(cluster: &Cluster) -> String {
    let output = cluster.run(&["-o", "json", "backup", "main"]);
    assert!(output.status.success(), "stderr: {}", output.stderr_string());
    let response: Value = serde_json::from_str(&output.stdout_string()).expect("valid JSON response");
    assert_eq!(response["type"], "BackupStarted");
    response["label"].as_str().expect("label").to_string()
}

#[test]
fn backup_is_refused_without_active_wal_streaming() {
    let cluster = Cluster::start_without_wal_streaming();

    let output = cluster.run(&["-o", "json", "backup", "main"]);
    assert!(!output.status.success());
    let response: Value = serde_json::from_str(&output.stdout_string()).unwrap();
    assert_eq!(response["type"], "Error");
    assert_eq!(response["code"], "WAL_STREAMING_INACTIVE");

    assert!(!cluster.backup_root().join("main").exists());
}

#[test]
fn a_successful_backup_appears_in_the_listing() {
    let cluster = Cluster::start();
    let label = backup_label(&cluster);

    let listing = cluster.run(&["-o", "json", "list", "main"]);
    assert!(listing.status.success());
    let response: Value = serde_json::from_str(&listing.stdout_string()).unwrap();
    let backups = response["backups"].as_array().expect("backups array");
    assert!(backups.iter().any(|b| b["label"] == label));
    assert_eq!(backups[0]["validity"], "Valid");
}

#[test]
fn verify_reports_zero_failures_for_a_freshly_taken_backup() {
    let cluster = Cluster::start();
    let label = backup_label(&cluster);

    let output = cluster.run(&["-o", "json", "verify", "main", &label]);
    assert!(output.status.success(), "stderr: {}", output.stderr_string());
    let response: Value = serde_json::from_str(&output.stdout_string()).unwrap();
    assert_eq!(response["type"], "Verified");
    assert_eq!(response["failed"].as_array().unwrap().len(), 0);
}

#[test]
fn archive_bundles_a_backup_into_the_requested_output_path() {
    let cluster = Cluster::start();
    let label = backup_label(&cluster);

    let archive_dir = tempfile::tempdir().unwrap();
    let output_path = archive_dir.path().join("main.tar.zst");

    let output = cluster.run(&["archive", "main", &label, output_path.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", output.stderr_string());
    assert!(output_path.exists());
}

#[test]
fn a_second_backup_links_against_the_first_as_its_predecessor() {
    let cluster = Cluster::start();
    let first = backup_label(&cluster);
    // Labels have one-second resolution; make sure the second backup gets
    // a distinct one.
    std::thread::sleep(std::time::Duration::from_millis(1100));
    let second = backup_label(&cluster);
    assert_ne!(first, second);

    let listing = cluster.run(&["-o", "json", "list", "main"]);
    let response: Value = serde_json::from_str(&listing.stdout_string()).unwrap();
    let backups = response["backups"].as_array().unwrap();
    assert_eq!(backups.len(), 2);
    assert!(backups.iter().all(|b| b["validity"] == "Valid"));
}
