// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup daemon library: the management protocol and its wire framing,
//! exposed for CLI clients to depend on directly instead of hand-rolling
//! a second copy of the JSON envelope.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod protocol;
pub mod protocol_wire;

pub use protocol::{
    BackupSummary, Header, Outcome, PROTOCOL_VERSION, Request, RequestEnvelope, Response,
    ResponseEnvelope, VerifyScope,
};
pub use protocol_wire::{
    MAX_MESSAGE_SIZE, ProtocolError, read_request, read_response, write_request, write_response,
};
