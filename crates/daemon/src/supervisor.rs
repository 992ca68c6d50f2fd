// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accept loop for the management socket: one spawned task per
//! connection, each reading a single request, dispatching it to a
//! [`driver`] function, and writing back the response.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use pgmoneta_core::config::Configuration;

use crate::driver::{self, DriverOutcome};
use crate::protocol::{Header, Outcome, Request, ResponseEnvelope};
use crate::protocol_wire::{self, ProtocolError};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Runs the accept loop until the process is killed. Each connection is
/// handled on its own spawned task so one slow client can't stall
/// others; the [`Configuration`] is shared read-only (gates inside it
/// provide the per-server exclusion the commands themselves need).
pub async fn run(listener: UnixListener, config: Arc<Configuration>) -> ! {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let config = Arc::clone(&config);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, &config).await {
                        match e {
                            ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
                                debug!("client disconnected");
                            }
                            ConnectionError::Protocol(ProtocolError::Timeout) => {
                                warn!("connection timed out waiting for a request");
                            }
                            other => error!(error = %other, "connection error"),
                        }
                    }
                });
            }
            Err(e) => error!(error = %e, "accept failed"),
        }
    }
}

async fn handle_connection(stream: UnixStream, config: &Configuration) -> Result<(), ConnectionError> {
    let envelope = protocol_wire::read_request(&stream).await?;
    info!(command = %envelope.header.command, originator = %envelope.header.originator_id, "received request");

    let started = Instant::now();
    let outcome = dispatch(config, envelope.request).await;
    let elapsed = started.elapsed();

    let response_envelope = ResponseEnvelope {
        header: Header::for_command(outcome_command(&outcome), &envelope.header.originator_id, envelope.header.timestamp_ms),
        outcome: if outcome.success {
            Outcome::success(elapsed)
        } else {
            Outcome::failure(error_code(&outcome))
        },
        response: outcome.response,
    };

    protocol_wire::write_response(&stream, &response_envelope).await?;
    Ok(())
}

fn outcome_command(outcome: &DriverOutcome) -> &'static str {
    use crate::protocol::Response;
    match &outcome.response {
        Response::Pong => "ping",
        Response::BackupStarted { .. } => "backup",
        Response::Backups { .. } => "list",
        Response::Deleted { .. } => "delete",
        Response::Restored { .. } => "restore",
        Response::Verified { .. } => "verify",
        Response::Archived { .. } => "archive",
        Response::RetentionApplied { .. } => "retention",
        Response::Error { .. } => "error",
    }
}

fn error_code(outcome: &DriverOutcome) -> String {
    use crate::protocol::Response;
    match &outcome.response {
        Response::Error { code, .. } => code.clone(),
        _ => "UNKNOWN".to_string(),
    }
}

async fn dispatch(config: &Configuration, request: Request) -> DriverOutcome {
    match request {
        Request::Ping => driver::ping().await,
        Request::Backup { server, major_version } => driver::backup(config, &server, major_version).await,
        Request::List { server } => driver::list(config, &server).await,
        Request::Delete { server, label } => driver::delete(config, &server, &label).await,
        Request::Restore { server, label, target_dir } => driver::restore(config, &server, &label, target_dir).await,
        Request::Verify { server, label, files } => driver::verify(config, &server, &label, files).await,
        Request::Archive { server, label, output_path } => driver::archive(config, &server, &label, output_path).await,
        Request::Retention { server } => driver::retention(config, &server).await,
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
