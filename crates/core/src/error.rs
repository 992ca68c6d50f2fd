// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The outcome taxonomy reported to callers of an operation (backup,
//! restore, delete, verify, list, archive) once it has finished, distinct
//! from the lower-level errors (`ManifestError`, `BitsetError`, ...)
//! internal modules raise while doing their part of the work.

use thiserror::Error;

use crate::workflow::Phase;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("configuration error: {0}")]
    Configuration(#[from] crate::config::ConfigError),

    #[error("{kind} is already active for server {server}")]
    Contention { server: String, kind: &'static str },

    #[error("resource error: {0}")]
    Resource(String),

    #[error("{phase} failed in stage {stage} for server {server}: {message}")]
    Workflow {
        server: String,
        stage: String,
        phase: Phase,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl OperationError {
    pub fn contention(server: impl Into<String>, kind: crate::gate::OperationKind) -> Self {
        OperationError::Contention {
            server: server.into(),
            kind: kind.as_str(),
        }
    }

    pub fn from_stage_error(server: impl Into<String>, err: crate::workflow::StageError) -> Self {
        OperationError::Workflow {
            server: server.into(),
            stage: err.stage,
            phase: err.phase,
            message: err.message,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
