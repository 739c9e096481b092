// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error codec for failures crossing the channel
//!
//! An error-like thrown value travels as an object carrying a reserved marker
//! key with `{name, message, stack}`, merged with the error's own enumerable
//! fields. Anything without the marker is a plain thrown value and passes
//! through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::collections::HashMap;

/// The `{name, message, stack}` triple stored under the marker key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Error kinds with a registered constructor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    TypeError,
    RangeError,
    ReferenceError,
    SyntaxError,
    EvalError,
    UriError,
    AggregateError,
    Custom(String),
}

impl ErrorKind {
    pub const BUILTIN: [ErrorKind; 8] = [
        ErrorKind::Error,
        ErrorKind::TypeError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::EvalError,
        ErrorKind::UriError,
        ErrorKind::AggregateError,
    ];

    pub fn name(&self) -> &str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::UriError => "URIError",
            ErrorKind::AggregateError => "AggregateError",
            ErrorKind::Custom(name) => name,
        }
    }
}

/// A failure reconstructed from the far side of a channel
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{name}: {message}")]
pub struct RemoteError {
    pub kind: ErrorKind,
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
    /// Own enumerable fields the original error carried
    pub fields: Map<String, Json>,
}

impl RemoteError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            name: kind.name().to_string(),
            kind,
            message: message.into(),
            stack: None,
            fields: Map::new(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&Json> {
        self.fields.get(key)
    }
}

/// Builds a [`RemoteError`] from a message
pub type ErrorConstructor = fn(String) -> RemoteError;

/// Name-keyed constructors used when reconstructing errors
///
/// Unknown names fall back to the generic `Error` kind.
#[derive(Clone)]
pub struct ErrorRegistry {
    constructors: HashMap<String, ErrorConstructor>,
}

impl ErrorRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry populated with the built-in error kinds
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("Error", |m| RemoteError::new(ErrorKind::Error, m));
        registry.register("TypeError", |m| RemoteError::new(ErrorKind::TypeError, m));
        registry.register("RangeError", |m| RemoteError::new(ErrorKind::RangeError, m));
        registry.register("ReferenceError", |m| {
            RemoteError::new(ErrorKind::ReferenceError, m)
        });
        registry.register("SyntaxError", |m| RemoteError::new(ErrorKind::SyntaxError, m));
        registry.register("EvalError", |m| RemoteError::new(ErrorKind::EvalError, m));
        registry.register("URIError", |m| RemoteError::new(ErrorKind::UriError, m));
        registry.register("AggregateError", |m| {
            RemoteError::new(ErrorKind::AggregateError, m)
        });
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, constructor: ErrorConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Construct an error by name, falling back to a generic error
    pub fn construct(&self, name: Option<&str>, message: String) -> RemoteError {
        match name.and_then(|n| self.constructors.get(n)) {
            Some(constructor) => constructor(message),
            None => RemoteError::new(ErrorKind::Error, message),
        }
    }
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for ErrorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("ErrorRegistry").field("names", &names).finish()
    }
}

/// A decoded failure payload
#[derive(Debug, Clone, PartialEq)]
pub enum Thrown {
    /// An error-like value, reconstructed
    Error(RemoteError),
    /// Any other thrown value, as sent
    Value(Json),
}

/// Serializes and reconstructs failures under a marker key
#[derive(Debug, Clone)]
pub struct ErrorCodec {
    marker: String,
    registry: ErrorRegistry,
}

impl ErrorCodec {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            registry: ErrorRegistry::builtin(),
        }
    }

    pub fn with_registry(mut self, registry: ErrorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn registry_mut(&mut self) -> &mut ErrorRegistry {
        &mut self.registry
    }

    /// Encode an error-like value from its envelope and own enumerable fields
    pub fn serialize(&self, envelope: &ErrorEnvelope, fields: Map<String, Json>) -> Json {
        let mut payload = Map::new();
        payload.insert(
            self.marker.clone(),
            serde_json::to_value(envelope).unwrap_or(Json::Null),
        );
        for (key, value) in fields {
            if key != self.marker {
                payload.insert(key, value);
            }
        }
        Json::Object(payload)
    }

    /// Encode an already reconstructed error, e.g. when relaying it onward
    pub fn serialize_remote(&self, error: &RemoteError) -> Json {
        let envelope = ErrorEnvelope {
            name: Some(error.name.clone()),
            message: Some(error.message.clone()),
            stack: error.stack.clone(),
        };
        self.serialize(&envelope, error.fields.clone())
    }

    /// Decode a failure payload
    ///
    /// Payloads without the marker key are returned as plain thrown values.
    pub fn deserialize(&self, payload: Json) -> Thrown {
        let mut fields = match payload {
            Json::Object(map) if map.contains_key(&self.marker) => map,
            other => return Thrown::Value(other),
        };
        let envelope = fields
            .remove(&self.marker)
            .and_then(|raw| serde_json::from_value::<ErrorEnvelope>(raw).ok());
        let envelope = match envelope {
            Some(envelope) => envelope,
            None => {
                tracing::debug!(marker = %self.marker, "error marker without a valid envelope");
                ErrorEnvelope::default()
            }
        };

        let mut error = self.registry.construct(
            envelope.name.as_deref(),
            envelope.message.clone().unwrap_or_default(),
        );
        for key in ["name", "message", "stack"] {
            fields.remove(key);
        }
        if let Some(name) = envelope.name {
            error.name = name;
        }
        error.stack = envelope.stack;
        error.fields = fields;
        Thrown::Error(error)
    }
}

impl Default for ErrorCodec {
    fn default() -> Self {
        crate::config::Config::default().error_codec()
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
