// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream compression, consumed by `CompressStage` and the archive
//! command, via `zstd` — the same crate used elsewhere for snapshot
//! compaction.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A capability for turning a file into its compressed form and back.
/// Consumed, not implemented, by the engine — new backends plug in here
/// without the engine knowing which one is active.
pub trait Compressor: Send + Sync {
    fn compress_file(&self, src: &Path, dst: &Path) -> Result<(), CompressError>;
    fn decompress_file(&self, src: &Path, dst: &Path) -> Result<(), CompressError>;
}

/// Zstandard-backed compressor at a fixed level.
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Compressor for ZstdCompressor {
    fn compress_file(&self, src: &Path, dst: &Path) -> Result<(), CompressError> {
        let input = BufReader::new(File::open(src)?);
        let output = BufWriter::new(File::create(dst)?);
        let mut encoder = zstd::Encoder::new(output, self.level)?;
        let mut input = input;
        io::copy(&mut input, &mut encoder)?;
        encoder.finish()?;
        Ok(())
    }

    fn decompress_file(&self, src: &Path, dst: &Path) -> Result<(), CompressError> {
        let input = BufReader::new(File::open(src)?);
        let mut decoder = zstd::Decoder::new(input)?;
        let mut output = BufWriter::new(File::create(dst)?);
        io::copy(&mut decoder, &mut output)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "compress_tests.rs"]
mod tests;
