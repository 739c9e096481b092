// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations a chain is recorded in
//!
//! Every payload that crosses the channel is plain JSON. `undefined` has no
//! JSON form: absent optional fields stand for it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;
use std::fmt;

/// A property key as carried on the wire
///
/// Canonical array indices serialize as JSON numbers, everything else as a
/// string. Both forms are accepted when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey(String);

impl PropertyKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The array index this key names, if it is a canonical one
    pub fn as_index(&self) -> Option<u32> {
        let n: u32 = self.0.parse().ok()?;
        if n == u32::MAX || n.to_string() != self.0 {
            return None;
        }
        Some(n)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&String> for PropertyKey {
    fn from(key: &String) -> Self {
        Self(key.clone())
    }
}

impl From<u32> for PropertyKey {
    fn from(index: u32) -> Self {
        Self(index.to_string())
    }
}

impl From<usize> for PropertyKey {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

impl From<i32> for PropertyKey {
    fn from(index: i32) -> Self {
        Self(index.to_string())
    }
}

impl Serialize for PropertyKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_index() {
            Some(index) => serializer.serialize_u32(index),
            None => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawKey {
            Unsigned(u64),
            Signed(i64),
            Float(f64),
            Name(String),
        }

        Ok(match RawKey::deserialize(deserializer)? {
            RawKey::Unsigned(n) => Self(n.to_string()),
            RawKey::Signed(n) => Self(n.to_string()),
            RawKey::Float(f) if f == 0.0 => Self("0".to_string()),
            RawKey::Float(f) if f.fract() == 0.0 && f.abs() < 1e21 => Self(format!("{f:.0}")),
            RawKey::Float(f) => Self(f.to_string()),
            RawKey::Name(s) => Self(s),
        })
    }
}

/// Wire form of a property descriptor
///
/// Every field is optional; absent fields keep their current (or default)
/// attribute when the descriptor is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAttributes {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumerable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub get: Option<Json>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub set: Option<Json>,
}

impl PropertyAttributes {
    /// A data descriptor carrying `value` and nothing else
    pub fn data(value: impl Into<Json>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_data(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }
}

/// Keeps an explicit `null` distinct from an absent field
pub(crate) fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Json>, D::Error> {
    Json::deserialize(deserializer).map(Some)
}

/// One deferred step of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    /// Call the running value with the previous value as receiver
    Apply {
        #[serde(rename = "argArray", default)]
        arg_array: Vec<Json>,
    },

    /// Instantiate the running value as a constructor
    Construct {
        #[serde(rename = "argArray", default)]
        arg_array: Vec<Json>,
    },

    DefineProperty {
        property: PropertyKey,
        attributes: PropertyAttributes,
    },

    DeleteProperty {
        property: PropertyKey,
    },

    Get {
        property: PropertyKey,
    },

    GetOwnPropertyDescriptor {
        property: PropertyKey,
    },

    GetPrototypeOf,

    Has {
        property: PropertyKey,
    },

    IsExtensible,

    OwnKeys,

    PreventExtensions,

    Set {
        property: PropertyKey,
        #[serde(rename = "newValue", default)]
        new_value: Json,
    },

    /// `null` clears the prototype
    SetPrototypeOf {
        prototype: Json,
    },
}

impl Operation {
    /// Whether replaying this step replaces the running value
    ///
    /// `Set`, `DeleteProperty` and `DefineProperty` are statements: the next
    /// step still sees the value they were applied to.
    pub fn produces_value(&self) -> bool {
        !matches!(
            self,
            Operation::Set { .. }
                | Operation::DeleteProperty { .. }
                | Operation::DefineProperty { .. }
        )
    }

    /// The property this step targets, if any
    pub fn property(&self) -> Option<&PropertyKey> {
        match self {
            Operation::DefineProperty { property, .. }
            | Operation::DeleteProperty { property }
            | Operation::Get { property }
            | Operation::GetOwnPropertyDescriptor { property }
            | Operation::Has { property }
            | Operation::Set { property, .. } => Some(property),
            Operation::Apply { .. }
            | Operation::Construct { .. }
            | Operation::GetPrototypeOf
            | Operation::IsExtensible
            | Operation::OwnKeys
            | Operation::PreventExtensions
            | Operation::SetPrototypeOf { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
