// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced channel wrapper for consistent observability

use crate::channel::{Channel, ChannelError, ChannelId, MessageHandler};
use serde_json::Value as Json;
use std::sync::Arc;

/// Wrapper that adds tracing to any Channel
#[derive(Clone)]
pub struct TracedChannel<C> {
    inner: C,
}

impl<C> TracedChannel<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

fn message_len(message: &Json) -> usize {
    serde_json::to_string(message).map(|s| s.len()).unwrap_or(0)
}

impl<C: Channel> Channel for TracedChannel<C> {
    fn id(&self) -> ChannelId {
        self.inner.id()
    }

    fn send(&self, message: Json) -> Result<(), ChannelError> {
        let span = tracing::debug_span!("channel.send", channel = %self.inner.id());
        let _guard = span.enter();

        let len = message_len(&message);
        let result = self.inner.send(message);
        match &result {
            Ok(()) => tracing::debug!(len, "sent"),
            Err(e) => tracing::error!(error = %e, "send failed"),
        }
        result
    }

    fn handler(&self) -> Option<MessageHandler> {
        self.inner.handler()
    }

    fn set_handler(&self, handler: Option<MessageHandler>) {
        let id = self.inner.id();
        tracing::debug!(channel = %id, installed = handler.is_some(), "handler installed");
        let handler = handler.map(|handler| -> MessageHandler {
            Arc::new(move |message: Json| {
                tracing::trace!(channel = %id, len = message_len(&message), "received");
                handler(message)
            })
        });
        self.inner.set_handler(handler)
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
