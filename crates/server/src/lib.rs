// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Remote side of flow-proxy
//!
//! A listener receives committed chains over a channel, resolves their
//! root, replays the operations against a [`Realm`](fp_realm::Realm) and
//! posts back exactly one result per commit.

mod codec;
mod executor;
mod listener;
mod resolver;

pub use codec::{JsonCodec, ValueCodec};
pub use executor::Executor;
pub use listener::{export, listen, listen_with, Listener, ServerError};
pub use resolver::{resolver_fn, FixedRoot, FnResolver, RootResolver, RootTable};
