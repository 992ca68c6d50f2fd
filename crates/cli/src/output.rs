// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use pgmoneta_daemon::{BackupSummary, Response};

use crate::table::{Column, Table};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render a backup listing per `format`.
pub fn print_backups(server: &str, backups: &[BackupSummary], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({ "server": server, "backups": backups });
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        }
        OutputFormat::Text => {
            if backups.is_empty() {
                println!("no backups for {server}");
                return;
            }
            let mut table = Table::new(vec![
                Column::left("LABEL"),
                Column::status("VALID"),
                Column::left("KEEP"),
                Column::right("SIZE"),
                Column::right("ELAPSED"),
            ]);
            for b in backups {
                table.row(vec![
                    b.label.clone(),
                    format!("{:?}", b.validity).to_lowercase(),
                    b.keep.to_string(),
                    human_bytes(b.backup_size),
                    format!("{:.1}s", b.elapsed_seconds),
                ]);
            }
            let mut out = std::io::stdout();
            table.render(&mut out);
        }
    }
}

/// Render any non-listing response per `format`.
pub fn print_response(response: &Response, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response).unwrap_or_default());
        }
        OutputFormat::Text => println!("{}", describe(response)),
    }
}

fn describe(response: &Response) -> String {
    match response {
        Response::Pong => "pong".to_string(),
        Response::BackupStarted { server, label } => format!("backup {label} started for {server}"),
        Response::Deleted { server, label } => format!("backup {label} deleted for {server}"),
        Response::Restored { server, label, target_dir } => {
            format!("backup {label} for {server} restored into {}", target_dir.display())
        }
        Response::Verified { server, label, failed, all } => {
            let summary = match all {
                Some(all) => format!("{}/{} files verified", all.len() - failed.len(), all.len()),
                None => format!("{} files failed verification", failed.len()),
            };
            format!("backup {label} for {server}: {summary}")
        }
        Response::Archived { server, label, output_path } => {
            format!("backup {label} for {server} archived to {}", output_path.display())
        }
        Response::Backups { server, backups } => format!("{} has {} backup(s)", server, backups.len()),
        Response::RetentionApplied { server, removed } => {
            if removed.is_empty() {
                format!("{server}: retention removed nothing")
            } else {
                format!("{server}: retention removed {}", removed.join(", "))
            }
        }
        Response::Error { code, message } => format!("error [{code}]: {message}"),
    }
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}B")
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
