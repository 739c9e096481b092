// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Client side of flow-proxy
//!
//! [`import`] yields a [`Handle`] bound to a channel. Each operation on a
//! handle returns a new handle recording one more step; nothing crosses
//! the channel until [`commit`] sends the whole chain and returns a
//! future for its result.

mod committer;
mod error;
mod handle;
pub mod immediate;

pub use committer::{commit, commit_with, CommitOptions, Committer, PendingCommit};
pub use error::{ClientError, CommitError};
pub use handle::{import, import_named, Handle};
