// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The encryption extension point. Encryption primitives are explicitly
//! out of scope; this module only fixes the capability's shape so
//! `EncryptStage` can be written and tested against it today. The only
//! shipped implementation is the no-op passthrough.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncryptError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub trait Encryptor: Send + Sync {
    fn encrypt_file(&self, src: &Path, dst: &Path) -> Result<(), EncryptError>;
    fn decrypt_file(&self, src: &Path, dst: &Path) -> Result<(), EncryptError>;
}

/// Copies bytes through unchanged. The only encryptor wired up by
/// default, since a real cipher is out of scope here.
pub struct NoOpEncryptor;

impl Encryptor for NoOpEncryptor {
    fn encrypt_file(&self, src: &Path, dst: &Path) -> Result<(), EncryptError> {
        let mut input = BufReader::new(File::open(src)?);
        let mut output = BufWriter::new(File::create(dst)?);
        io::copy(&mut input, &mut output)?;
        Ok(())
    }

    fn decrypt_file(&self, src: &Path, dst: &Path) -> Result<(), EncryptError> {
        self.encrypt_file(src, dst)
    }
}

/// Records calls without touching the filesystem, for stage tests that
/// only care whether encryption was invoked.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeEncryptor {
    calls: parking_lot::Mutex<Vec<(std::path::PathBuf, std::path::PathBuf)>>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakeEncryptor {
    fn default() -> Self {
        Self {
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl FakeEncryptor {
    pub fn calls(&self) -> Vec<(std::path::PathBuf, std::path::PathBuf)> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Encryptor for FakeEncryptor {
    fn encrypt_file(&self, src: &Path, dst: &Path) -> Result<(), EncryptError> {
        self.calls.lock().push((src.to_path_buf(), dst.to_path_buf()));
        std::fs::copy(src, dst)?;
        Ok(())
    }

    fn decrypt_file(&self, src: &Path, dst: &Path) -> Result<(), EncryptError> {
        self.encrypt_file(src, dst)
    }
}

#[cfg(test)]
#[path = "encrypt_tests.rs"]
mod tests;
