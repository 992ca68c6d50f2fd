// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File hashing: SHA-224/256/384/512 plus CRC-32C, the algorithms a
//! backup's manifest and verify stage can name.

use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use thiserror::Error;

const READ_BUF_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Crc32c,
}

#[derive(Debug, Error)]
pub enum HashError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}

impl HashAlgorithm {
    pub fn parse(name: &str) -> Result<Self, HashError> {
        match name.to_ascii_lowercase().as_str() {
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            "crc32c" => Ok(HashAlgorithm::Crc32c),
            other => Err(HashError::UnknownAlgorithm(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Crc32c => "crc32c",
        }
    }
}

/// Hash `path` with `algorithm`, returning lowercase hex.
pub fn hash_file(algorithm: HashAlgorithm, path: &Path) -> Result<String, HashError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buf = [0u8; READ_BUF_SIZE];

    macro_rules! digest_loop {
        ($hasher:expr) => {{
            let mut hasher = $hasher;
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            hex::encode(hasher.finalize())
        }};
    }

    let digest = match algorithm {
        HashAlgorithm::Sha224 => digest_loop!(Sha224::new()),
        HashAlgorithm::Sha256 => digest_loop!(Sha256::new()),
        HashAlgorithm::Sha384 => digest_loop!(Sha384::new()),
        HashAlgorithm::Sha512 => digest_loop!(Sha512::new()),
        HashAlgorithm::Crc32c => {
            let mut crc = 0u32;
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                crc = crc32c::crc32c_append(crc, &buf[..n]);
            }
            format!("{crc:08x}")
        }
    };

    Ok(digest)
}

/// Thin local re-implementation of hex encoding to avoid pulling in the
/// `hex` crate for a one-line need; kept private to this module.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        use std::fmt::Write;
        let mut out = String::with_capacity(bytes.as_ref().len() * 2);
        for b in bytes.as_ref() {
            let _ = write!(out, "{b:02x}");
        }
        out
    }
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod tests;
