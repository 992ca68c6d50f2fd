// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Management protocol: the JSON envelope exchanged between a CLI client
//! and the daemon. `Header` carries invocation metadata shared by both
//! directions; `Outcome` carries the success/failure result the server
//! attaches to its `Response`.
//!
//! Every request and response body is a JSON object serialized with a
//! `type` tag via `#[serde(tag = "type")]`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use pgmoneta_core::backup::Validity;

/// Protocol version, derived from this crate's own version rather than a
/// build-time git hash, since there's no build script wiring one up.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared invocation metadata, present on every request and response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Header {
    pub command: String,
    pub protocol_version: String,
    pub originator_id: String,
    pub timestamp_ms: u64,
}

impl Header {
    pub fn for_command(command: impl Into<String>, originator_id: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            command: command.into(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            originator_id: originator_id.into(),
            timestamp_ms,
        }
    }
}

/// What the files scope of a verify request should include.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VerifyScope {
    /// Only rows that failed verification.
    Failed,
    /// Every row, whether it verified or not.
    All,
}

/// A request from a client to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    Backup {
        server: String,
        major_version: u32,
    },
    List {
        server: String,
    },
    Delete {
        server: String,
        label: String,
    },
    Restore {
        server: String,
        label: String,
        target_dir: PathBuf,
    },
    Verify {
        server: String,
        label: String,
        files: VerifyScope,
    },
    Archive {
        server: String,
        label: String,
        output_path: PathBuf,
    },
    Retention {
        server: String,
    },
}

impl Request {
    /// The command name carried in this request's `Header`.
    pub fn command_name(&self) -> &'static str {
        match self {
            Request::Ping => "ping",
            Request::Backup { .. } => "backup",
            Request::List { .. } => "list",
            Request::Delete { .. } => "delete",
            Request::Restore { .. } => "restore",
            Request::Verify { .. } => "verify",
            Request::Archive { .. } => "archive",
            Request::Retention { .. } => "retention",
        }
    }
}

/// A single backup, as reported to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupSummary {
    pub label: String,
    pub validity: Validity,
    pub keep: bool,
    pub backup_size: u64,
    pub restore_size: u64,
    pub elapsed_seconds: f64,
    pub linking_elapsed_seconds: Option<f64>,
    pub comments: Option<String>,
    /// Absolute starting WAL segment for this backup.
    pub wal: String,
    /// Segment count since the predecessor backup, if any.
    pub delta: Option<u64>,
}

/// A response from the daemon to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    BackupStarted {
        server: String,
        label: String,
    },
    Backups {
        server: String,
        backups: Vec<BackupSummary>,
    },
    Deleted {
        server: String,
        label: String,
    },
    Restored {
        server: String,
        label: String,
        target_dir: PathBuf,
    },
    Verified {
        server: String,
        label: String,
        failed: Vec<serde_json::Value>,
        all: Option<Vec<serde_json::Value>>,
    },
    Archived {
        server: String,
        label: String,
        output_path: PathBuf,
    },
    RetentionApplied {
        server: String,
        removed: Vec<String>,
    },
    Error {
        code: String,
        message: String,
    },
}

/// The result category attached to every response: `{status, time}` on
/// success, `{status: false, error}` on failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    pub fn success(elapsed: std::time::Duration) -> Self {
        Self {
            status: true,
            time: Some(format!("{:.3}s", elapsed.as_secs_f64())),
            error: None,
        }
    }

    pub fn failure(code: impl Into<String>) -> Self {
        Self {
            status: false,
            time: None,
            error: Some(code.into()),
        }
    }
}

/// The full request-side envelope a client sends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestEnvelope {
    pub header: Header,
    pub request: Request,
}

/// The full response-side envelope the daemon sends back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    pub header: Header,
    pub response: Response,
    pub outcome: Outcome,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
