// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener installation

use crate::executor::Executor;
use crate::resolver::{FixedRoot, RootResolver};
use fp_adapters::{install_handler, Channel, ChannelId, MessageHandler};
use fp_core::{Body, Config, Envelope, ErrorCodec};
use futures::FutureExt;
use fp_realm::{Realm, Value};
use serde_json::Value as Json;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;
use tokio::runtime::Handle;

/// Errors from installing a listener
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServerError {
    #[error("{0} already has a listener")]
    AlreadyListening(ChannelId),
    #[error("listeners must be installed from within a Tokio runtime")]
    NoRuntime,
}

fn listening() -> &'static Mutex<HashSet<ChannelId>> {
    static LISTENING: OnceLock<Mutex<HashSet<ChannelId>>> = OnceLock::new();
    LISTENING.get_or_init(Default::default)
}

/// An installed listener
///
/// The listener stays installed for the life of the channel; dropping
/// this value does not remove it.
#[derive(Clone)]
pub struct Listener {
    channel_id: ChannelId,
    executor: Arc<Executor>,
}

impl Listener {
    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}

/// Serve a single fixed root on `channel`
pub fn export<C: Channel>(channel: C, realm: Realm, root: Value) -> Result<Listener, ServerError> {
    listen(channel, realm, FixedRoot(root))
}

/// Serve roots chosen by `resolver` on `channel`
pub fn listen<C: Channel>(
    channel: C,
    realm: Realm,
    resolver: impl RootResolver,
) -> Result<Listener, ServerError> {
    let config = Config::from_env();
    listen_with(
        channel,
        Executor::new(realm, resolver),
        config.envelope(),
        config.error_codec(),
    )
}

/// Install `executor` on `channel`, answering commits found under `envelope`
///
/// Each commit is replayed on its own task; results go back over the
/// same channel, with failures serialized by `errors`. A channel accepts
/// at most one listener.
pub fn listen_with<C: Channel>(
    channel: C,
    executor: Executor,
    envelope: Envelope,
    errors: ErrorCodec,
) -> Result<Listener, ServerError> {
    let runtime = Handle::try_current().map_err(|_| ServerError::NoRuntime)?;
    let channel_id = channel.id();
    if !listening()
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(channel_id)
    {
        tracing::warn!(channel = %channel_id, "listener already installed");
        return Err(ServerError::AlreadyListening(channel_id));
    }

    let channel: Arc<dyn Channel> = Arc::new(channel);
    let executor = Arc::new(executor.with_error_codec(errors));
    install_handler(
        channel.as_ref(),
        commit_handler(Arc::clone(&channel), Arc::clone(&executor), envelope, runtime),
    );
    tracing::info!(channel = %channel_id, "listening");

    Ok(Listener {
        channel_id,
        executor,
    })
}

fn commit_handler(
    channel: Arc<dyn Channel>,
    executor: Arc<Executor>,
    envelope: Envelope,
    runtime: Handle,
) -> MessageHandler {
    Arc::new(move |message: Json| {
        let Some(Body::Commit(commit)) = envelope.open(&message) else {
            return;
        };
        let channel = Arc::clone(&channel);
        let executor = Arc::clone(&executor);
        let envelope = envelope.clone();
        runtime.spawn(async move {
            let result = match AssertUnwindSafe(executor.respond(&commit)).catch_unwind().await {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!(commit_id = %commit.commit_id, "replay panicked");
                    executor.aborted(&commit)
                }
            };
            let reply = match envelope.wrap(&Body::Result(result)) {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!(commit_id = %commit.commit_id, error = %e, "result could not be encoded");
                    return;
                }
            };
            if let Err(e) = channel.send(reply) {
                tracing::error!(commit_id = %commit.commit_id, error = %e, "result send failed");
            }
        });
    })
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
