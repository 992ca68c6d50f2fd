//! Deleting a backup, and the error when deleting it again.

use serde_json::Value;

use crate::prelude::{Cluster, OutputExt};

fn backup_label(cluster: &Cluster) -> String {
    let output = cluster.run(&["-o", "json", "backup", "main"]);
    assert!(output.status.success());
    let response: Value = serde_json::from_str(&output.stdout_string()).unwrap();
    response["label"].as_str().unwrap().to_string()
}

#[test]
fn deleting_a_backup_removes_it_from_the_listing() {
    let cluster = Cluster::start();
    let label = backup_label(&cluster);

    let delete = cluster.run(&["delete", "main", &label]);
    assert!(delete.status.success(), "stderr: {}", delete.stderr_string());

    let listing = cluster.run(&["-o", "json", "list", "main"]);
    let response: Value = serde_json::from_str(&listing.stdout_string()).unwrap();
    assert!(response["backups"].as_array().unwrap().is_empty());
}

#[test]
fn deleting_the_same_backup_twice_reports_an_unknown_backup_error() {
    let cluster = Cluster::start();
    let label = backup_label(&cluster);

    let first = cluster.run(&["delete", "main", &label]);
    assert!(first.status.success());

    let second = cluster.run(&["delete", "main", &label]);
    assert!(!second.status.success());
    assert!(second.stderr_string().contains("UNKNOWN_BACKUP"));
}

#[test]
fn deleting_an_unknown_backup_label_is_an_error() {
    let cluster = Cluster::start();
    let output = cluster.run(&["delete", "main", "19700101000000"]);
    assert!(!output.status.success());
    assert!(output.stderr_string().contains("UNKNOWN_BACKUP"));
}
