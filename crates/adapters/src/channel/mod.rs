// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message channels between the two ends of a chain
//!
//! A channel carries JSON messages both ways and exposes a single
//! settable handler for inbound messages, event-listener style.
//! [`install_handler`] adds a handler without clobbering the one
//! already installed.

mod memory;

pub use memory::MemoryChannel;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeChannel;

use serde_json::Value as Json;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors from channel operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,
    #[error("send failed: {0}")]
    Send(String),
}

/// Process-unique identity of a channel
///
/// Registries that must hold one committer or one listener per channel
/// are keyed by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

impl ChannelId {
    /// Allocate a fresh identity
    pub fn next() -> Self {
        Self(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel-{}", self.0)
    }
}

/// Callback for inbound messages
pub type MessageHandler = Arc<dyn Fn(Json) + Send + Sync>;

/// A bidirectional message channel
pub trait Channel: Send + Sync + 'static {
    fn id(&self) -> ChannelId;

    /// Post a message to the other end; never waits for delivery
    fn send(&self, message: Json) -> Result<(), ChannelError>;

    /// The currently installed inbound handler
    fn handler(&self) -> Option<MessageHandler>;

    /// Replace the inbound handler
    fn set_handler(&self, handler: Option<MessageHandler>);
}

impl<C: Channel + ?Sized> Channel for Arc<C> {
    fn id(&self) -> ChannelId {
        (**self).id()
    }

    fn send(&self, message: Json) -> Result<(), ChannelError> {
        (**self).send(message)
    }

    fn handler(&self) -> Option<MessageHandler> {
        (**self).handler()
    }

    fn set_handler(&self, handler: Option<MessageHandler>) {
        (**self).set_handler(handler)
    }
}

static INSTALL_LOCK: Mutex<()> = Mutex::new(());

/// Install `handler` on `channel`, keeping any handler already there
///
/// The new handler runs first. A previous handler still receives every
/// message, deferred to a separate task when a Tokio runtime is
/// available so it never runs inside the new handler's call.
pub fn install_handler(channel: &dyn Channel, handler: MessageHandler) {
    let _guard = INSTALL_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let chained: MessageHandler = match channel.handler() {
        None => handler,
        Some(previous) => {
            tracing::debug!(channel = %channel.id(), "chaining onto existing handler");
            Arc::new(move |message: Json| {
                handler(message.clone());
                defer(Arc::clone(&previous), message);
            })
        }
    };
    channel.set_handler(Some(chained));
}

fn defer(handler: MessageHandler, message: Json) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move { handler(message) });
        }
        Err(_) => handler(message),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
