// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client error types

use fp_adapters::{ChannelError, ChannelId};
use fp_core::RemoteError;
use serde_json::Value as Json;
use thiserror::Error;

/// Local failures, reported synchronously and never sent over the wire
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("handle is bound to {handle}, committer serves {committer}")]
    ForeignHandle {
        handle: ChannelId,
        committer: ChannelId,
    },
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
    #[error("failed to encode commit: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why a committed chain did not produce a value
#[derive(Debug, Error)]
pub enum CommitError {
    /// The chain threw an error-like value on the remote side
    #[error("remote {0}")]
    Remote(RemoteError),
    /// The chain threw something that is not an error
    #[error("remote threw {0}")]
    Thrown(Json),
    #[error("pending commit dropped without a response")]
    Abandoned,
    #[error("could not decode return value: {0}")]
    Decode(serde_json::Error),
    #[error(transparent)]
    Submit(#[from] ClientError),
}

impl CommitError {
    /// The remote error, when the failure was error-like
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            CommitError::Remote(error) => Some(error),
            _ => None,
        }
    }
}
