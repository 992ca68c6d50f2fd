// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Re-hashes every file named in a backup's manifest and compares it
//! byte-exact against the stored digest. Mismatches, missing files, and
//! hashing failures are recorded rather than treated as pool failures —
//! a single bad file doesn't stop the rest of the sweep.

use async_trait::async_trait;
use std::path::PathBuf;

use pgmoneta_adapters::hash::{self, HashAlgorithm};
use pgmoneta_core::bag::Bag;
use pgmoneta_core::manifest::ManifestReader;
use pgmoneta_core::pool::WorkerPool;
use pgmoneta_core::workflow::{Phase, Stage, StageError};

pub struct VerifyStage {
    manifest_path: PathBuf,
    data_dir: PathBuf,
    algorithm: HashAlgorithm,
    worker_count: usize,
    /// When true, successfully verified rows are also pushed onto the
    /// bag's `all` deque (the `files == all` request option).
    include_all: bool,
}

impl VerifyStage {
    pub fn new(
        manifest_path: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        algorithm: HashAlgorithm,
        worker_count: usize,
        include_all: bool,
    ) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            data_dir: data_dir.into(),
            algorithm,
            worker_count,
            include_all,
        }
    }

    async fn verify_one(path: PathBuf, expected: String, algorithm: HashAlgorithm, directory: PathBuf, bag: Bag, include_all: bool) -> bool {
        let full_path = directory.join(&path);
        let computed = hash::hash_file(algorithm, &full_path);

        match computed {
            Ok(digest) if digest == expected => {
                if include_all {
                    bag.with_mut("all", |v| {
                        if let Some(deque) = v.as_deque_mut() {
                            deque.push_back(serde_json::json!({
                                "path": path.to_string_lossy(),
                                "hash": digest,
                            }));
                        }
                    });
                }
            }
            Ok(digest) => {
                bag.with_mut("failed", |v| {
                    if let Some(deque) = v.as_deque_mut() {
                        deque.push_back(serde_json::json!({
                            "path": path.to_string_lossy(),
                            "expected_hash": expected,
                            "computed_hash": digest,
                        }));
                    }
                });
            }
            Err(_) => {
                bag.with_mut("failed", |v| {
                    if let Some(deque) = v.as_deque_mut() {
                        deque.push_back(serde_json::json!({
                            "path": path.to_string_lossy(),
                            "expected_hash": expected,
                            "computed_hash": "Unknown",
                        }));
                    }
                });
            }
        }

        true
    }
}

#[async_trait]
impl Stage for VerifyStage {
    fn name(&self) -> &str {
        "verify"
    }

    async fn execute(&self, bag: &Bag) -> Result<(), StageError> {
        let rows = ManifestReader::read_all(&self.manifest_path)
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))?;

        let mut pool = WorkerPool::new(self.worker_count);
        for (path, expected) in rows {
            pool.add(Self::verify_one(
                path,
                expected,
                self.algorithm,
                self.data_dir.clone(),
                bag.clone(),
                self.include_all,
            ))
            .await;
        }

        pool.wait()
            .await
            .map_err(|e| StageError::new(self.name(), Phase::Execute, e.to_string()))
    }
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
