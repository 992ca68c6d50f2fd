// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire framing for the management socket.
//!
//! Frame: `compression: u8, encryption: u8, length: u32 (big-endian),
//! body: utf8 JSON` — a plain 4-byte length prefix plus the two extra
//! tag bytes this protocol's envelope carries. Neither tag is acted on
//! yet (no frame-level compression or encryption is implemented); a
//! non-zero value is accepted and logged, not rejected, so a future
//! capability can start setting it without breaking old clients.
//!
//! Reads are non-blocking (`UnixStream::try_read`) with a bounded
//! retry — 10ms backoff, 100 attempts, 1s total — standing in for the
//! original's blocking-socket short-read retry loop.

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::net::UnixStream;

use crate::protocol::{RequestEnvelope, ResponseEnvelope};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
    #[error("connection closed")]
    ConnectionClosed,
    #[error("timed out waiting for data")]
    Timeout,
}

pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;
const RETRY_BACKOFF: Duration = Duration::from_millis(10);
const RETRY_ATTEMPTS: usize = 100;

const COMPRESSION_NONE: u8 = 0;
const ENCRYPTION_NONE: u8 = 0;

async fn read_with_retry(stream: &UnixStream, buf: &mut [u8]) -> Result<(), ProtocolError> {
    let mut filled = 0;
    let mut attempts = 0;
    while filled < buf.len() {
        match stream.try_read(&mut buf[filled..]) {
            Ok(0) => return Err(ProtocolError::ConnectionClosed),
            Ok(n) => {
                filled += n;
                attempts = 0;
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                attempts += 1;
                if attempts > RETRY_ATTEMPTS {
                    return Err(ProtocolError::Timeout);
                }
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn write_with_retry(stream: &UnixStream, buf: &[u8]) -> Result<(), ProtocolError> {
    let mut written = 0;
    let mut attempts = 0;
    while written < buf.len() {
        match stream.try_write(&buf[written..]) {
            Ok(n) => {
                written += n;
                attempts = 0;
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                attempts += 1;
                if attempts > RETRY_ATTEMPTS {
                    return Err(ProtocolError::Timeout);
                }
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn read_frame(stream: &UnixStream) -> Result<Vec<u8>, ProtocolError> {
    let mut prefix = [0u8; 6];
    read_with_retry(stream, &mut prefix).await?;

    let compression = prefix[0];
    let encryption = prefix[1];
    if compression != COMPRESSION_NONE {
        tracing::warn!(compression, "frame declares an unsupported compression tag");
    }
    if encryption != ENCRYPTION_NONE {
        tracing::warn!(encryption, "frame declares an unsupported encryption tag");
    }

    let length = u32::from_be_bytes([prefix[2], prefix[3], prefix[4], prefix[5]]) as usize;
    if length > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: length,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut body = vec![0u8; length];
    read_with_retry(stream, &mut body).await?;
    Ok(body)
}

async fn write_frame(stream: &UnixStream, body: &[u8]) -> Result<(), ProtocolError> {
    if body.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: body.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut frame = Vec::with_capacity(6 + body.len());
    frame.push(COMPRESSION_NONE);
    frame.push(ENCRYPTION_NONE);
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(body);

    write_with_retry(stream, &frame).await
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub async fn read_request(stream: &UnixStream) -> Result<RequestEnvelope, ProtocolError> {
    let body = read_frame(stream).await?;
    decode(&body)
}

pub async fn write_request(stream: &UnixStream, envelope: &RequestEnvelope) -> Result<(), ProtocolError> {
    let body = encode(envelope)?;
    write_frame(stream, &body).await
}

pub async fn read_response(stream: &UnixStream) -> Result<ResponseEnvelope, ProtocolError> {
    let body = read_frame(stream).await?;
    decode(&body)
}

pub async fn write_response(stream: &UnixStream, envelope: &ResponseEnvelope) -> Result<(), ProtocolError> {
    let body = encode(envelope)?;
    write_frame(stream, &body).await
}

#[cfg(test)]
#[path = "protocol_wire_tests.rs"]
mod tests;
