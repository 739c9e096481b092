// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process channel backed by Tokio mpsc queues

use super::{Channel, ChannelError, ChannelId, MessageHandler};
use serde_json::Value as Json;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;

struct Endpoint {
    id: ChannelId,
    handler: Mutex<Option<MessageHandler>>,
    outbound: mpsc::UnboundedSender<Json>,
}

impl Endpoint {
    fn current_handler(&self) -> Option<MessageHandler> {
        self.handler.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// One end of an in-process channel
///
/// Messages are delivered in send order, asynchronously, by a pump task
/// per endpoint. Messages that arrive while no handler is installed are
/// dropped. Creating a channel requires a running Tokio runtime.
#[derive(Clone)]
pub struct MemoryChannel {
    endpoint: Arc<Endpoint>,
}

impl MemoryChannel {
    /// Two connected endpoints: what one sends, the other receives
    pub fn pair() -> (Self, Self) {
        let (to_left, left_inbox) = mpsc::unbounded_channel();
        let (to_right, right_inbox) = mpsc::unbounded_channel();
        let left = Self::endpoint(to_right);
        let right = Self::endpoint(to_left);
        left.start(left_inbox);
        right.start(right_inbox);
        (left, right)
    }

    /// A single endpoint that receives its own messages
    pub fn loopback() -> Self {
        let (outbound, inbox) = mpsc::unbounded_channel();
        let channel = Self::endpoint(outbound);
        channel.start(inbox);
        channel
    }

    fn endpoint(outbound: mpsc::UnboundedSender<Json>) -> Self {
        Self {
            endpoint: Arc::new(Endpoint {
                id: ChannelId::next(),
                handler: Mutex::new(None),
                outbound,
            }),
        }
    }

    fn start(&self, inbox: mpsc::UnboundedReceiver<Json>) {
        tokio::spawn(pump(inbox, Arc::downgrade(&self.endpoint)));
    }
}

async fn pump(mut inbox: mpsc::UnboundedReceiver<Json>, endpoint: Weak<Endpoint>) {
    while let Some(message) = inbox.recv().await {
        let Some(endpoint) = endpoint.upgrade() else {
            break;
        };
        match endpoint.current_handler() {
            Some(handler) => handler(message),
            None => tracing::trace!(channel = %endpoint.id, "no handler; message dropped"),
        }
    }
}

impl Channel for MemoryChannel {
    fn id(&self) -> ChannelId {
        self.endpoint.id
    }

    fn send(&self, message: Json) -> Result<(), ChannelError> {
        self.endpoint
            .outbound
            .send(message)
            .map_err(|_| ChannelError::Closed)
    }

    fn handler(&self) -> Option<MessageHandler> {
        self.endpoint.current_handler()
    }

    fn set_handler(&self, handler: Option<MessageHandler>) {
        *self.endpoint.handler.lock().unwrap_or_else(|e| e.into_inner()) = handler;
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
