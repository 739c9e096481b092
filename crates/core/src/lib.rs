// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fp-core: Wire model for the flow-proxy protocol
//!
//! This crate provides:
//! - The operation vocabulary a chain is recorded in
//! - The namespaced message envelope and its commit/result bodies
//! - The error codec used for failures crossing the channel
//! - Configuration and commit-id generation

pub mod config;
pub mod errors;
pub mod id;
pub mod message;
pub mod operation;
pub mod traced;

pub use config::{Config, ConfigError, DEFAULT_NAMESPACE, NAMESPACE_ENV};
pub use errors::{ErrorCodec, ErrorEnvelope, ErrorKind, ErrorRegistry, RemoteError, Thrown};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use message::{Body, CommitData, Envelope, Outcome, ResultData};
pub use operation::{Operation, PropertyAttributes, PropertyKey};
pub use traced::TracedOperation;
