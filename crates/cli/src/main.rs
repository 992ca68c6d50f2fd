// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pgmoneta - command-line client for the pgmonetad management socket.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod color;
mod output;
mod table;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pgmoneta_daemon::{Response, VerifyScope};

use client::DaemonClient;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "pgmoneta", version, about = "Backup and recovery client for a pgmonetad instance")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the daemon is reachable.
    Ping,
    /// Start a backup of a server.
    Backup {
        server: String,
        /// PostgreSQL major version of the target server.
        #[arg(long, default_value_t = 16)]
        major_version: u32,
    },
    /// List backups held for a server.
    List { server: String },
    /// Delete a backup.
    Delete { server: String, label: String },
    /// Restore a backup into a target directory.
    Restore {
        server: String,
        label: String,
        target_dir: PathBuf,
    },
    /// Verify a backup's manifest against the files on disk.
    Verify {
        server: String,
        label: String,
        /// Report every file, not just the ones that failed.
        #[arg(long)]
        all: bool,
    },
    /// Bundle a backup into a single archive file.
    Archive {
        server: String,
        label: String,
        output_path: PathBuf,
    },
    /// Apply the configured retention policy to a server's backups.
    Retention { server: String },
}

fn socket_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("PGMONETA_SOCKET_PATH") {
        return Ok(PathBuf::from(path));
    }
    let home = std::env::var("HOME").context("could not resolve a socket path (set PGMONETA_SOCKET_PATH or HOME)")?;
    Ok(PathBuf::from(home).join(".local/state/pgmoneta/pgmoneta.sock"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let socket_path = socket_path()?;
    let client = DaemonClient::connect(&socket_path)?;

    match cli.command {
        Commands::Ping => {
            client.ping().await?;
            output::print_response(&Response::Pong, cli.output);
        }
        Commands::Backup { server, major_version } => {
            let response = client.backup(&server, major_version).await?;
            output::print_response(&response, cli.output);
        }
        Commands::List { server } => {
            let response = client.list(&server).await?;
            if let Response::Backups { server, backups } = response {
                output::print_backups(&server, &backups, cli.output);
            } else {
                output::print_response(&response, cli.output);
            }
        }
        Commands::Delete { server, label } => {
            let response = client.delete(&server, &label).await?;
            output::print_response(&response, cli.output);
        }
        Commands::Restore { server, label, target_dir } => {
            let response = client.restore(&server, &label, target_dir).await?;
            output::print_response(&response, cli.output);
        }
        Commands::Verify { server, label, all } => {
            let scope = if all { VerifyScope::All } else { VerifyScope::Failed };
            let response = client.verify(&server, &label, scope).await?;
            output::print_response(&response, cli.output);
        }
        Commands::Archive { server, label, output_path } => {
            let response = client.archive(&server, &label, output_path).await?;
            output::print_response(&response, cli.output);
        }
        Commands::Retention { server } => {
            let response = client.retention(&server).await?;
            output::print_response(&response, cli.output);
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
