// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk configuration (`pgmoneta.toml`) and the process-wide state it
//! seeds.
//!
//! The original treats configuration as a process-wide blob read once
//! at boot (`create_shared_memory -> init_configuration ->
//! read_configuration`) and reached for from anywhere. Here it is
//! loaded once (`Configuration::load`) and handed to every component as
//! an injected `Arc<Configuration>` constructor argument instead of a
//! global.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::gate::ServerGate;
use crate::server::Server;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown server: {0}")]
    UnknownServer(String),
}

/// Raw TOML shape for one server entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(default = "default_true")]
    pub valid: bool,
    #[serde(default)]
    pub wal_streaming: bool,
    #[serde(default = "default_wal_segment_size")]
    pub wal_segment_size: u64,
    pub workers: Option<usize>,
    pub hash_algorithm: Option<String>,
    #[serde(default)]
    pub cluster_member: bool,
    pub backup_root: PathBuf,
    pub wal_root: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_wal_segment_size() -> u64 {
    16 * 1024 * 1024
}

/// Raw TOML shape for the whole configuration file.
#[derive(Debug, Clone, Deserialize)]
struct RawConfiguration {
    #[serde(default = "default_global_workers")]
    workers: usize,
    #[serde(default = "default_hash_algorithm")]
    hash_algorithm: String,
    retention_count: Option<usize>,
    retention_days: Option<i64>,
    #[serde(default)]
    server: Vec<ServerConfig>,
}

fn default_global_workers() -> usize {
    2
}

fn default_hash_algorithm() -> String {
    "sha256".to_string()
}

/// Process-wide, injected state: parsed server list plus the gates
/// guarding them. One instance is built at daemon startup and shared
/// (via `Arc`) with every component that needs it.
pub struct Configuration {
    pub global_workers: usize,
    pub global_hash_algorithm: String,
    pub retention_count: Option<usize>,
    pub retention_days: Option<i64>,
    servers: HashMap<String, Server>,
    gates: HashMap<String, ServerGate>,
}

impl Configuration {
    /// Parse a `pgmoneta.toml` file into a fully-populated configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfiguration = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfiguration) -> Self {
        let mut servers = HashMap::new();
        let mut gates = HashMap::new();

        for sc in raw.server {
            let server = Server {
                name: sc.name.clone(),
                host: sc.host,
                port: sc.port,
                valid: sc.valid,
                wal_streaming: sc.wal_streaming,
                wal_segment_size: sc.wal_segment_size,
                workers: sc.workers,
                hash_algorithm: sc.hash_algorithm,
                cluster_member: sc.cluster_member,
                backup_root: sc.backup_root,
                wal_root: sc.wal_root,
            };
            gates.insert(sc.name.clone(), ServerGate::new());
            servers.insert(sc.name, server);
        }

        Self {
            global_workers: raw.workers,
            global_hash_algorithm: raw.hash_algorithm,
            retention_count: raw.retention_count,
            retention_days: raw.retention_days,
            servers,
            gates,
        }
    }

    pub fn server(&self, name: &str) -> Result<&Server, ConfigError> {
        self.servers
            .get(name)
            .ok_or_else(|| ConfigError::UnknownServer(name.to_string()))
    }

    pub fn gate(&self, name: &str) -> Result<&ServerGate, ConfigError> {
        self.gates
            .get(name)
            .ok_or_else(|| ConfigError::UnknownServer(name.to_string()))
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.servers.values()
    }

    pub fn worker_count(&self, server: &Server) -> usize {
        server.workers.unwrap_or(self.global_workers)
    }

    pub fn hash_algorithm(&self, server: &Server) -> String {
        server
            .hash_algorithm
            .clone()
            .unwrap_or_else(|| self.global_hash_algorithm.clone())
    }

    /// Build a configuration directly from server records, bypassing
    /// TOML parsing. Used by tests and by `test-support` builders.
    #[cfg(any(test, feature = "test-support"))]
    pub fn from_servers(global_workers: usize, global_hash_algorithm: &str, servers: Vec<Server>) -> Self {
        let mut map = HashMap::new();
        let mut gates = HashMap::new();
        for s in servers {
            gates.insert(s.name.clone(), ServerGate::new());
            map.insert(s.name.clone(), s);
        }
        Self {
            global_workers,
            global_hash_algorithm: global_hash_algorithm.to_string(),
            retention_count: None,
            retention_days: None,
            servers: map,
            gates,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
