// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Records that a backup lives on the local file system. The extension
//! point future remote-storage stages (S3, object storage, ...) would
//! implement instead of this one, sharing the same `Stage` contract.

use async_trait::async_trait;

use pgmoneta_core::bag::Bag;
use pgmoneta_core::workflow::{Stage, StageError};

pub struct LocalStorageStage {
    label: String,
}

impl LocalStorageStage {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

#[async_trait]
impl Stage for LocalStorageStage {
    fn name(&self) -> &str {
        "local_storage"
    }

    async fn execute(&self, _bag: &Bag) -> Result<(), StageError> {
        tracing::debug!(label = %self.label, "backup stored on local file system");
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_storage_tests.rs"]
mod tests;
