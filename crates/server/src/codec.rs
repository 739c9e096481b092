// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversion between wire payloads and realm values

use fp_realm::{Realm, Value};
use serde_json::Value as Json;

/// Turns wire payloads into realm values and back
///
/// Deployments that need to carry richer values (functions, binary data)
/// plug in their own codec.
pub trait ValueCodec: Send + Sync + 'static {
    fn decode(&self, realm: &Realm, payload: &Json) -> Value;

    /// `Ok(None)` for values with no encoding (`undefined`); `Err` with a
    /// thrown value when the value cannot be transmitted
    fn encode(&self, realm: &Realm, value: &Value) -> Result<Option<Json>, Value>;
}

/// Plain JSON: objects, arrays and primitives
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn decode(&self, realm: &Realm, payload: &Json) -> Value {
        realm.from_json(payload)
    }

    fn encode(&self, realm: &Realm, value: &Value) -> Result<Option<Json>, Value> {
        realm.to_json(value)
    }
}
