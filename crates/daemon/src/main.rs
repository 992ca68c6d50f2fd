// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pgmonetad
//!
//! Background process that owns the management socket and dispatches
//! backup/restore/verify/archive commands against the servers named in
//! `pgmoneta.toml`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod driver;
mod env;
mod protocol;
mod protocol_wire;
mod supervisor;

use std::sync::Arc;

use pgmoneta_core::config::Configuration;
use tokio::net::UnixListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("pgmonetad {VERSION}");
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                eprintln!("Usage: pgmonetad [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    setup_logging();

    let config_path = env::config_path().ok_or("could not resolve a configuration path (set PGMONETA_CONFIG_PATH or HOME)")?;
    let config = Configuration::load(&config_path)?;
    info!(path = %config_path.display(), "loaded configuration");

    let socket_path = env::socket_path().ok_or("could not resolve a socket path (set PGMONETA_SOCKET_PATH or HOME)")?;
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = std::fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)?;
    info!(path = %socket_path.display(), "listening on management socket");

    println!("READY");

    supervisor::run(listener, Arc::new(config)).await
}

fn print_help() {
    println!("pgmonetad {VERSION}");
    println!("Backup daemon for a relational database cluster");
    println!();
    println!("USAGE:");
    println!("    pgmonetad");
    println!();
    println!("The daemon is typically started once per host and should not be");
    println!("invoked directly by most users. It listens on a Unix socket for");
    println!("commands from the pgmoneta-cli client.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    PGMONETA_CONFIG_PATH   Path to pgmoneta.toml (default: ~/.config/pgmoneta/pgmoneta.toml)");
    println!("    PGMONETA_SOCKET_PATH   Path to the management socket (default: ~/.local/state/pgmoneta/pgmoneta.sock)");
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}
