// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

const DEFAULT_CONFIG_RELATIVE: &str = ".config/pgmoneta/pgmoneta.toml";
const DEFAULT_SOCKET_RELATIVE: &str = ".local/state/pgmoneta/pgmoneta.sock";

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Resolve the configuration file path: `PGMONETA_CONFIG_PATH` >
/// `~/.config/pgmoneta/pgmoneta.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("PGMONETA_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }
    home_dir().map(|home| home.join(DEFAULT_CONFIG_RELATIVE))
}

/// Resolve the management socket path: `PGMONETA_SOCKET_PATH` >
/// `~/.local/state/pgmoneta/pgmoneta.sock`.
pub fn socket_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("PGMONETA_SOCKET_PATH") {
        return Some(PathBuf::from(path));
    }
    home_dir().map(|home| home.join(DEFAULT_SOCKET_RELATIVE))
}
