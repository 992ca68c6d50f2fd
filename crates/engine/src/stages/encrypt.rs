// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encrypts every file under a backup's `data/` tree in place, using
//! whichever [`Encryptor`] capability the caller injected. Real cipher
//! implementations are out of scope here; the stage only fixes the
//! contract so it composes correctly with the rest of the pipeline.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pgmoneta_adapters::encrypt::Encryptor;
use pgmoneta_core::bag::Bag;
use pgmoneta_core::workflow::{Phase, Stage, StageError};

pub struct EncryptStage {
    data_dir: PathBuf,
    encryptor: Arc<dyn Encryptor>,
}

impl EncryptStage {
    pub fn new(data_dir: impl Into<PathBuf>, encryptor: Arc<dyn Encryptor>) -> Self {
        Self {
            data_dir: data_dir.into(),
            encryptor,
        }
    }

    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                Self::walk(&path, out)?;
            } else {
                out.push(path);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Stage for EncryptStage {
    fn name(&self) -> &str {
        "encrypt"
    }

    async fn execute(&self, _bag: &Bag) -> Result<(), StageError> {
        if !self.data_dir.exists() {
            return Ok(());
        }

        let mut files = Vec::new();
        Self::walk(&self.data_dir, &mut files)
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;

        for path in files {
            let tmp = path.with_extension("enc.tmp");
            self.encryptor
                .encrypt_file(&path, &tmp)
                .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
            std::fs::rename(&tmp, &path)
                .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "encrypt_tests.rs"]
mod tests;
