// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::protocol::{Header, Request};
use tokio::net::UnixStream;

fn sample_request() -> RequestEnvelope {
    RequestEnvelope {
        header: Header::for_command("ping", "cli", 0),
        request: Request::Ping,
    }
}

#[tokio::test]
async fn request_round_trips_over_a_unix_socket_pair() {
    let (client, server) = UnixStream::pair().unwrap();
    let sent = sample_request();
    write_request(&client, &sent).await.unwrap();
    let received = read_request(&server).await.unwrap();
    assert_eq!(sent, received);
}

#[tokio::test]
async fn response_round_trips_over_a_unix_socket_pair() {
    let (client, server) = UnixStream::pair().unwrap();
    let sent = ResponseEnvelope {
        header: Header::for_command("ping", "daemon", 0),
        response: crate::protocol::Response::Pong,
        outcome: crate::protocol::Outcome::success(std::time::Duration::from_millis(5)),
    };
    write_response(&server, &sent).await.unwrap();
    let received = read_response(&client).await.unwrap();
    assert_eq!(sent, received);
}

#[tokio::test]
async fn oversized_frame_is_rejected_before_reading_the_body() {
    let (client, server) = UnixStream::pair().unwrap();
    let mut prefix = Vec::with_capacity(6);
    prefix.push(0u8);
    prefix.push(0u8);
    prefix.extend_from_slice(&((MAX_MESSAGE_SIZE as u32) + 1).to_be_bytes());
    write_with_retry_for_test(&client, &prefix).await;
    let err = read_request(&server).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

async fn write_with_retry_for_test(stream: &UnixStream, buf: &[u8]) {
    let mut written = 0;
    while written < buf.len() {
        match stream.try_write(&buf[written..]) {
            Ok(n) => written += n,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
            Err(e) => panic!("unexpected write error: {e}"),
        }
    }
}

#[tokio::test]
async fn read_on_a_closed_connection_reports_connection_closed() {
    let (client, server) = UnixStream::pair().unwrap();
    drop(client);
    let err = read_request(&server).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}
