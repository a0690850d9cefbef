// SPDX-License-Identifier: MIT

//! clai daemon library
//!
//! Exposes the IPC protocol types for use by CLI clients, mirroring the
//! teacher's `lib.rs` (which exposes only `protocol` to the sibling CLI
//! crate; the rest of the daemon's module tree is private to the `claid`
//! binary).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod protocol;

pub use protocol::{
    ProtocolError, Request, Response, DEFAULT_TIMEOUT, E_INVALID_REQUEST, E_NO_FEEDBACK_STORE,
    E_STORE_ERROR, MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};
