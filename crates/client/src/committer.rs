// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Committing chains and correlating their results
//!
//! One [`Committer`] serves each channel. It owns the pending table that
//! maps commit ids to the futures waiting on them, and a handler on the
//! channel that settles those futures as results arrive.

use crate::error::{ClientError, CommitError};
use crate::handle::Handle;
use fp_adapters::{install_handler, Channel, ChannelId, MessageHandler};
use fp_core::{
    Body, CommitData, Config, Envelope, ErrorCodec, IdGen, Outcome, ResultData, Thrown, UuidIdGen,
};
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Per-commit options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOptions {
    /// Skip encoding the return value; the commit resolves to `None`
    pub omit_return: bool,
}

type PendingTable = Mutex<HashMap<String, oneshot::Sender<ResultData>>>;

/// Sends chains over one channel and settles their futures
pub struct Committer {
    channel: Arc<dyn Channel>,
    envelope: Envelope,
    codec: ErrorCodec,
    ids: Box<dyn IdGen>,
    pending: Arc<PendingTable>,
}

fn registry() -> &'static Mutex<HashMap<ChannelId, Arc<Committer>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<ChannelId, Arc<Committer>>>> = OnceLock::new();
    REGISTRY.get_or_init(Default::default)
}

/// Commit `handle`'s chain through its channel's committer
pub fn commit(handle: &Handle) -> Result<PendingCommit, ClientError> {
    commit_with(handle, CommitOptions::default())
}

pub fn commit_with(handle: &Handle, options: CommitOptions) -> Result<PendingCommit, ClientError> {
    Committer::for_channel(Arc::clone(&handle.binding().channel)).commit(handle, options)
}

impl Committer {
    /// The channel's committer, created from the environment's config on first use
    pub fn for_channel(channel: Arc<dyn Channel>) -> Arc<Committer> {
        let config = Config::from_env();
        Self::install(channel, config.envelope(), config.error_codec(), Box::new(UuidIdGen))
    }

    /// The channel's committer, created with these settings on first use
    ///
    /// Settings only apply when no committer exists yet for the channel;
    /// later calls return the existing instance unchanged.
    pub fn install(
        channel: Arc<dyn Channel>,
        envelope: Envelope,
        codec: ErrorCodec,
        ids: Box<dyn IdGen>,
    ) -> Arc<Committer> {
        let mut committers = registry().lock().unwrap_or_else(|e| e.into_inner());
        let channel_id = channel.id();
        if let Some(existing) = committers.get(&channel_id) {
            return Arc::clone(existing);
        }

        let pending: Arc<PendingTable> = Arc::default();
        install_handler(
            channel.as_ref(),
            result_handler(envelope.clone(), Arc::clone(&pending)),
        );
        tracing::debug!(channel = %channel_id, namespace = envelope.namespace(), "committer installed");

        let committer = Arc::new(Committer {
            channel,
            envelope,
            codec,
            ids,
            pending,
        });
        committers.insert(channel_id, Arc::clone(&committer));
        committer
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel.id()
    }

    /// Commits sent whose results have not arrived
    pub fn pending_count(&self) -> usize {
        self.pending_table().len()
    }

    /// Drop the pending entry for `commit_id`; its future fails with `Abandoned`
    pub fn abandon(&self, commit_id: &str) -> bool {
        self.pending_table().remove(commit_id).is_some()
    }

    fn pending_table(&self) -> MutexGuard<'_, HashMap<String, oneshot::Sender<ResultData>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Send the chain; the commit is on the wire when this returns
    pub fn commit(&self, handle: &Handle, options: CommitOptions) -> Result<PendingCommit, ClientError> {
        let channel_id = self.channel.id();
        if handle.channel_id() != channel_id {
            return Err(ClientError::ForeignHandle {
                handle: handle.channel_id(),
                committer: channel_id,
            });
        }

        let commit_id = self.ids.next_id();
        let body = Body::Commit(CommitData {
            commit_id: commit_id.clone(),
            operations: handle.operations(),
            root_key: handle.root_key().map(str::to_string),
            omit_return: options.omit_return.then_some(true),
        });
        let message = self.envelope.wrap(&body)?;

        let (sender, receiver) = oneshot::channel();
        self.pending_table().insert(commit_id.clone(), sender);
        if let Err(e) = self.channel.send(message) {
            self.pending_table().remove(&commit_id);
            tracing::error!(commit_id = %commit_id, channel = %channel_id, error = %e, "commit send failed");
            return Err(e.into());
        }

        tracing::debug!(
            commit_id = %commit_id,
            channel = %channel_id,
            operations = handle.len(),
            root_key = ?handle.root_key(),
            omit_return = options.omit_return,
            "commit sent"
        );
        Ok(PendingCommit {
            commit_id,
            receiver,
            omit_return: options.omit_return,
            codec: self.codec.clone(),
        })
    }
}

fn result_handler(envelope: Envelope, pending: Arc<PendingTable>) -> MessageHandler {
    Arc::new(move |message: Json| {
        let Some(Body::Result(result)) = envelope.open(&message) else {
            return;
        };
        let waiting = pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&result.commit_id);
        match waiting {
            Some(sender) => {
                tracing::debug!(commit_id = %result.commit_id, outcome = ?result.result, "result received");
                // The caller may have dropped the future; nothing to settle then
                let _ = sender.send(result);
            }
            None => tracing::trace!(commit_id = %result.commit_id, "no pending commit for result"),
        }
    })
}

/// The future result of one commit
///
/// Resolves to the chain's final value (`None` for `undefined` or when the
/// return was omitted) or to the decoded remote failure.
#[must_use = "a commit's outcome is only observed by awaiting it"]
pub struct PendingCommit {
    commit_id: String,
    receiver: oneshot::Receiver<ResultData>,
    omit_return: bool,
    codec: ErrorCodec,
}

impl PendingCommit {
    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    /// Await the result and deserialize it; `undefined` decodes as `null`
    pub async fn decode<T: DeserializeOwned>(self) -> Result<T, CommitError> {
        let value = self.await?.unwrap_or(Json::Null);
        serde_json::from_value(value).map_err(CommitError::Decode)
    }

    fn settle(&self, result: ResultData) -> Result<Option<Json>, CommitError> {
        match result.result {
            Outcome::Success if self.omit_return => Ok(None),
            Outcome::Success => Ok(result.return_value),
            Outcome::Failure => {
                match self.codec.deserialize(result.thrown.unwrap_or(Json::Null)) {
                    Thrown::Error(error) => Err(CommitError::Remote(error)),
                    Thrown::Value(value) => Err(CommitError::Thrown(value)),
                }
            }
        }
    }
}

impl Future for PendingCommit {
    type Output = Result<Option<Json>, CommitError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(_)) => Poll::Ready(Err(CommitError::Abandoned)),
            Poll::Ready(Ok(result)) => Poll::Ready(this.settle(result)),
        }
    }
}

impl std::fmt::Debug for PendingCommit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCommit")
            .field("commit_id", &self.commit_id)
            .field("omit_return", &self.omit_return)
            .finish()
    }
}

#[cfg(test)]
#[path = "committer_tests.rs"]
mod tests;
