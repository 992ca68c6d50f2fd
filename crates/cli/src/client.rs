// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client: connects to the management socket and exchanges one
//! request/response pair per call.

use std::path::PathBuf;
use std::time::Duration;

use pgmoneta_daemon::protocol_wire::{self, ProtocolError};
use pgmoneta_daemon::{Header, Request, Response, ResponseEnvelope};
use thiserror::Error;
use tokio::net::UnixStream;

fn timeout_ms(var: &str, default_ms: u64) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(default_ms))
}

/// Timeout for a full request/response round trip.
pub fn request_timeout() -> Duration {
    timeout_ms("PGMONETA_TIMEOUT_MS", 30_000)
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (no socket at {0})")]
    NotRunning(PathBuf),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("the daemon reported an error ({code}): {message}")]
    Rejected { code: String, message: String },
}

/// A thin client for one management socket.
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to an already-running daemon. Does not spawn one — if
    /// nothing is listening, the caller is told to start `pgmonetad`
    /// themselves (this client does not manage the daemon's lifecycle).
    pub fn connect(socket_path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let socket_path = socket_path.into();
        if !socket_path.exists() {
            return Err(ClientError::NotRunning(socket_path));
        }
        Ok(Self { socket_path })
    }

    async fn send(&self, request: Request) -> Result<ResponseEnvelope, ClientError> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|_| ClientError::NotRunning(self.socket_path.clone()))?;

        let envelope = pgmoneta_daemon::RequestEnvelope {
            header: Header::for_command(request.command_name(), "pgmoneta-cli", 0),
            request,
        };

        let timeout = request_timeout();
        tokio::time::timeout(timeout, protocol_wire::write_request(&stream, &envelope))
            .await
            .map_err(|_| ClientError::Timeout(timeout))??;

        let response = tokio::time::timeout(timeout, protocol_wire::read_response(&stream))
            .await
            .map_err(|_| ClientError::Timeout(timeout))??;

        if !response.outcome.status {
            return Err(ClientError::Rejected {
                code: response.outcome.error.clone().unwrap_or_else(|| "UNKNOWN".to_string()),
                message: describe(&response.response),
            });
        }
        Ok(response)
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        self.send(Request::Ping).await.map(|_| ())
    }

    pub async fn backup(&self, server: &str, major_version: u32) -> Result<Response, ClientError> {
        Ok(self
            .send(Request::Backup {
                server: server.to_string(),
                major_version,
            })
            .await?
            .response)
    }

    pub async fn list(&self, server: &str) -> Result<Response, ClientError> {
        Ok(self.send(Request::List { server: server.to_string() }).await?.response)
    }

    pub async fn delete(&self, server: &str, label: &str) -> Result<Response, ClientError> {
        Ok(self
            .send(Request::Delete {
                server: server.to_string(),
                label: label.to_string(),
            })
            .await?
            .response)
    }

    pub async fn restore(&self, server: &str, label: &str, target_dir: PathBuf) -> Result<Response, ClientError> {
        Ok(self
            .send(Request::Restore {
                server: server.to_string(),
                label: label.to_string(),
                target_dir,
            })
            .await?
            .response)
    }

    pub async fn verify(&self, server: &str, label: &str, files: pgmoneta_daemon::VerifyScope) -> Result<Response, ClientError> {
        Ok(self
            .send(Request::Verify {
                server: server.to_string(),
                label: label.to_string(),
                files,
            })
            .await?
            .response)
    }

    pub async fn archive(&self, server: &str, label: &str, output_path: PathBuf) -> Result<Response, ClientError> {
        Ok(self
            .send(Request::Archive {
                server: server.to_string(),
                label: label.to_string(),
                output_path,
            })
            .await?
            .response)
    }

    pub async fn retention(&self, server: &str) -> Result<Response, ClientError> {
        Ok(self.send(Request::Retention { server: server.to_string() }).await?.response)
    }
}

fn describe(response: &Response) -> String {
    match response {
        Response::Error { message, .. } => message.clone(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
