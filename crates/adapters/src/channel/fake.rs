// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake channel for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Channel, ChannelError, ChannelId, MessageHandler};
use serde_json::Value as Json;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeState {
    sent: Vec<Json>,
    handler: Option<MessageHandler>,
    fail_sends: bool,
}

/// Fake channel: records outbound messages, delivers inbound ones on demand
#[derive(Clone)]
pub struct FakeChannel {
    id: ChannelId,
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChannel {
    pub fn new() -> Self {
        Self {
            id: ChannelId::next(),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    /// All messages sent so far
    pub fn sent(&self) -> Vec<Json> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).sent.clone()
    }

    /// Drain and return the messages sent so far
    pub fn take_sent(&self) -> Vec<Json> {
        std::mem::take(&mut self.state.lock().unwrap_or_else(|e| e.into_inner()).sent)
    }

    /// Make subsequent sends fail with `ChannelError::Closed`
    pub fn fail_sends(&self, fail: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_sends = fail;
    }

    /// Deliver an inbound message to the installed handler, inline
    ///
    /// Returns whether a handler was installed.
    pub fn deliver(&self, message: Json) -> bool {
        let handler = self.handler();
        match handler {
            Some(handler) => {
                handler(message);
                true
            }
            None => false,
        }
    }
}

impl Channel for FakeChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn send(&self, message: Json) -> Result<(), ChannelError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_sends {
            return Err(ChannelError::Closed);
        }
        state.sent.push(message);
        Ok(())
    }

    fn handler(&self) -> Option<MessageHandler> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).handler.clone()
    }

    fn set_handler(&self, handler: Option<MessageHandler>) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).handler = handler;
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
