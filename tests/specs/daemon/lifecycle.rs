//! Daemon reachability and an empty server's listing.

use crate::prelude::{Cluster, OutputExt};

#[test]
fn ping_succeeds_against_a_freshly_started_daemon() {
    let cluster = Cluster::start();
    let output = cluster.run(&["ping"]);
    assert!(output.status.success(), "stderr: {}", output.stderr_string());
    assert!(output.stdout_string().contains("pong"));
}

#[test]
fn list_reports_no_backups_for_a_server_with_none_taken() {
    let cluster = Cluster::start();
    let output = cluster.run(&["list", "main"]);
    assert!(output.status.success(), "stderr: {}", output.stderr_string());
    assert!(output.stdout_string().contains("no backups for main"));
}

#[test]
fn unknown_server_is_reported_as_an_error() {
    let cluster = Cluster::start();
    let output = cluster.run(&["list", "nope"]);
    assert!(!output.status.success());
    assert!(output.stderr_string().contains("UNKNOWN_SERVER"));
}
