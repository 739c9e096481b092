// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message envelope and protocol bodies
//!
//! Every message this protocol sends is a JSON object with a single,
//! protocol-private key holding the body. Traffic without that key belongs to
//! someone else sharing the channel and is ignored.

use crate::operation::{present, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A commit request: one chain to replay against a remote root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitData {
    pub commit_id: String,
    pub operations: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omit_return: Option<bool>,
}

impl CommitData {
    pub fn omits_return(&self) -> bool {
        self.omit_return.unwrap_or(false)
    }
}

/// Whether a replay completed or threw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// The answer to exactly one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultData {
    pub commit_id: String,
    pub result: Outcome,
    /// Absent when the value was `undefined` or the caller omitted it
    #[serde(
        rename = "return",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub return_value: Option<Json>,
    /// Encoded failure, see [`crate::errors::ErrorCodec`]
    #[serde(
        rename = "throw",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub thrown: Option<Json>,
}

impl ResultData {
    pub fn success(commit_id: impl Into<String>, return_value: Option<Json>) -> Self {
        Self {
            commit_id: commit_id.into(),
            result: Outcome::Success,
            return_value,
            thrown: None,
        }
    }

    pub fn failure(commit_id: impl Into<String>, thrown: Json) -> Self {
        Self {
            commit_id: commit_id.into(),
            result: Outcome::Failure,
            return_value: None,
            thrown: Some(thrown),
        }
    }
}

/// Protocol bodies, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Body {
    Commit(CommitData),
    Result(ResultData),
}

impl Body {
    pub fn commit_id(&self) -> &str {
        match self {
            Body::Commit(commit) => &commit.commit_id,
            Body::Result(result) => &result.commit_id,
        }
    }
}

/// Wraps and unwraps bodies under a namespace key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    namespace: String,
}

impl Envelope {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Wrap a body into a channel message
    pub fn wrap(&self, body: &Body) -> Result<Json, serde_json::Error> {
        let mut message = serde_json::Map::new();
        message.insert(self.namespace.clone(), serde_json::to_value(body)?);
        Ok(Json::Object(message))
    }

    /// Extract this protocol's body from an inbound message
    ///
    /// Looks under the namespace key directly, then under `data` for hosts
    /// that deliver event objects. Returns `None` for foreign traffic,
    /// unknown body types and malformed bodies.
    pub fn open(&self, message: &Json) -> Option<Body> {
        let raw = message
            .get(&self.namespace)
            .or_else(|| message.get("data").and_then(|data| data.get(&self.namespace)))?;
        if !raw.is_object() {
            return None;
        }
        match Body::deserialize(raw) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::trace!(namespace = %self.namespace, error = %e, "ignoring malformed body");
                None
            }
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_NAMESPACE)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
