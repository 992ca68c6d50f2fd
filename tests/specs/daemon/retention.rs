//! Retention: without a configured policy, `retention` is a no-op that
//! still reports success.

use serde_json::Value;

use crate::prelude::Cluster;

#[test]
fn retention_with_no_policy_reports_nothing_removed() {
    let cluster = Cluster::start();
    cluster.run(&["backup", "main"]);

    let output = cluster.run(&["-o", "json", "retention", "main"]);
    assert!(output.status.success());
    let response: Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(response["type"], "RetentionApplied");
    assert_eq!(response["removed"].as_array().unwrap().len(), 0);
}

#[test]
fn retention_against_an_unknown_server_is_an_error() {
    let cluster = Cluster::start();
    let output = cluster.run(&["retention", "does-not-exist"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("UNKNOWN_SERVER"));
}
