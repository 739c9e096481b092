// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversion between realm values and JSON payloads

use crate::object::{Object, PropertyDescriptor};
use crate::realm::Realm;
use crate::value::Value;
use fp_core::PropertyKey;
use serde_json::{Map, Number, Value as Json};

impl Realm {
    /// Encode a value as JSON; top-level `undefined` has no encoding
    ///
    /// Object members holding `undefined` are skipped; inside arrays
    /// `undefined` and non-finite numbers become `null`. Functions,
    /// pending results and circular structures throw a `TypeError`.
    pub fn to_json(&self, value: &Value) -> Result<Option<Json>, Value> {
        self.encode(value, &mut Vec::new())
    }

    fn encode(&self, value: &Value, stack: &mut Vec<Object>) -> Result<Option<Json>, Value> {
        Ok(Some(match value {
            Value::Undefined => return Ok(None),
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Promise(_) => {
                return Err(self.type_error("#<Promise> could not be cloned"));
            }
            Value::Object(object) if object.is_callable() || object.is_constructor() => {
                return Err(self.type_error(format!("{} could not be cloned", value.describe())));
            }
            Value::Object(object) => {
                if stack.iter().any(|seen| seen.ptr_eq(object)) {
                    return Err(self.type_error("Converting circular structure to JSON"));
                }
                stack.push(object.clone());
                let encoded = if object.is_array() {
                    self.encode_array(value, stack)
                } else {
                    self.encode_object(value, object, stack)
                };
                stack.pop();
                encoded?
            }
        }))
    }

    fn encode_array(&self, value: &Value, stack: &mut Vec<Object>) -> Result<Json, Value> {
        let length = self.walk_length(value, "Invalid string length")?;
        let mut items = Vec::new();
        for index in 0..length {
            let element = self.get(value, &PropertyKey::from(index))?;
            items.push(self.encode(&element, stack)?.unwrap_or(Json::Null));
        }
        Ok(Json::Array(items))
    }

    fn encode_object(&self, value: &Value, object: &Object, stack: &mut Vec<Object>) -> Result<Json, Value> {
        let mut map = Map::new();
        for key in object.own_keys() {
            let enumerable = object
                .get_own_property(&key)
                .is_some_and(|property| property.is_enumerable());
            if !enumerable {
                continue;
            }
            let member = self.get(value, &key)?;
            if let Some(encoded) = self.encode(&member, stack)? {
                map.insert(key.as_str().to_string(), encoded);
            }
        }
        Ok(Json::Object(map))
    }

    /// Decode JSON into fresh realm objects and arrays
    pub fn from_json(&self, json: &Json) -> Value {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Object(
                self.new_array(items.iter().map(|item| self.from_json(item)).collect()),
            ),
            Json::Object(map) => {
                let object = self.new_object();
                for (key, member) in map {
                    object.define_own_property(
                        PropertyKey::from(key.as_str()),
                        PropertyDescriptor::data(self.from_json(member)),
                    );
                }
                Value::Object(object)
            }
        }
    }

    /// Decode an optional payload, where absence means `undefined`
    pub fn from_json_opt(&self, json: Option<&Json>) -> Value {
        json.map(|json| self.from_json(json)).unwrap_or(Value::Undefined)
    }
}

fn number_to_json(n: f64) -> Json {
    if !n.is_finite() {
        return Json::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        // -0 encodes as 0, as the host does
        return Json::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
