// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replay of committed chains
//!
//! The interpreter keeps the two most recent running values. `Apply`
//! uses the older one as its receiver, which makes `Get(method)` then
//! `Apply(args)` a method call on the object the method came from.
//! `Set`, `DeleteProperty` and `DefineProperty` leave both untouched.

use crate::codec::{JsonCodec, ValueCodec};
use crate::resolver::RootResolver;
use fp_core::{
    CommitData, Config, ErrorCodec, ErrorEnvelope, ErrorKind, Operation, PropertyAttributes,
    RemoteError, ResultData, TracedOperation,
};
use fp_realm::{Object, PropertyDescriptor, Realm, Value};
use serde_json::{Map, Value as Json};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Resolves roots and replays chains against one realm
#[derive(Clone)]
pub struct Executor {
    realm: Realm,
    resolver: Arc<dyn RootResolver>,
    codec: Arc<dyn ValueCodec>,
    errors: ErrorCodec,
}

impl Executor {
    pub fn new(realm: Realm, resolver: impl RootResolver) -> Self {
        Self {
            realm,
            resolver: Arc::new(resolver),
            codec: Arc::new(JsonCodec),
            errors: Config::from_env().error_codec(),
        }
    }

    pub fn with_codec(mut self, codec: impl ValueCodec) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn with_error_codec(mut self, errors: ErrorCodec) -> Self {
        self.errors = errors;
        self
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// Run one commit and build its result message
    pub async fn respond(&self, commit: &CommitData) -> ResultData {
        let span = tracing::info_span!(
            "commit",
            commit_id = %commit.commit_id,
            root_key = ?commit.root_key,
            operations = commit.operations.len(),
        );
        async {
            tracing::info!("replaying");
            let start = Instant::now();
            let outcome = self.run(commit).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            let outcome = outcome.and_then(|value| {
                if commit.omits_return() {
                    return Ok(None);
                }
                self.codec.encode(&self.realm, &value)
            });
            match outcome {
                Ok(return_value) => {
                    tracing::info!(elapsed_ms, "completed");
                    ResultData::success(commit.commit_id.clone(), return_value)
                }
                Err(thrown) => {
                    tracing::error!(elapsed_ms, error = %thrown.describe(), "failed");
                    ResultData::failure(commit.commit_id.clone(), self.serialize_thrown(&thrown))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// The failure reported for a commit whose replay never finished
    pub fn aborted(&self, commit: &CommitData) -> ResultData {
        let error = RemoteError::new(ErrorKind::Error, "replay aborted unexpectedly");
        ResultData::failure(commit.commit_id.clone(), self.errors.serialize_remote(&error))
    }

    /// Resolve the commit's root and replay its operations
    pub async fn run(&self, commit: &CommitData) -> Result<Value, Value> {
        let root = self
            .resolver
            .resolve(&self.realm, commit.root_key.as_deref())
            .await?;
        let root = settle(root).await?;
        self.replay(root, &commit.operations).await
    }

    /// Apply `operations` to `root` in order and return the final value
    ///
    /// Stops at the first operation that throws. Pending results are
    /// awaited after every value-producing step.
    pub async fn replay(&self, root: Value, operations: &[Operation]) -> Result<Value, Value> {
        let mut previous = Value::Undefined;
        let mut current = root;

        for (step, operation) in operations.iter().enumerate() {
            tracing::trace!(
                step,
                operation = operation.name(),
                fields = ?operation.fields(),
                "replay step"
            );
            let Some(next) = self.step(&previous, &current, operation)? else {
                continue;
            };
            let next = settle(next).await?;
            previous = std::mem::replace(&mut current, next);
        }
        Ok(current)
    }

    /// `Ok(None)` for statements that produce no value
    fn step(&self, previous: &Value, current: &Value, operation: &Operation) -> Result<Option<Value>, Value> {
        let realm = &self.realm;
        let value = match operation {
            Operation::Apply { arg_array } => {
                realm.call(current, previous.clone(), self.decode_all(arg_array))?
            }
            Operation::Construct { arg_array } => realm.construct(current, self.decode_all(arg_array))?,
            Operation::DefineProperty {
                property,
                attributes,
            } => {
                let descriptor = self.descriptor(attributes)?;
                realm.define_property(current, property, descriptor)?;
                return Ok(None);
            }
            Operation::DeleteProperty { property } => {
                realm.delete_property(current, property)?;
                return Ok(None);
            }
            Operation::Get { property } => realm.get(current, property)?,
            Operation::GetOwnPropertyDescriptor { property } => {
                realm.get_own_property_descriptor(current, property)?
            }
            Operation::GetPrototypeOf => realm.get_prototype_of(current)?,
            Operation::Has { property } => Value::Bool(realm.has(current, property)?),
            Operation::IsExtensible => Value::Bool(realm.is_extensible(current)),
            Operation::OwnKeys => realm.own_keys(current)?,
            Operation::PreventExtensions => realm.prevent_extensions(current)?,
            Operation::Set {
                property,
                new_value,
            } => {
                realm.set(current, property, self.codec.decode(realm, new_value))?;
                return Ok(None);
            }
            Operation::SetPrototypeOf { prototype } => {
                realm.set_prototype_of(current, &self.codec.decode(realm, prototype))?
            }
        };
        Ok(Some(value))
    }

    fn decode_all(&self, payloads: &[Json]) -> Vec<Value> {
        payloads
            .iter()
            .map(|payload| self.codec.decode(&self.realm, payload))
            .collect()
    }

    /// ToPropertyDescriptor over wire attributes
    fn descriptor(&self, attributes: &PropertyAttributes) -> Result<PropertyDescriptor, Value> {
        let realm = &self.realm;
        if attributes.is_accessor() && attributes.is_data() {
            return Err(realm.type_error(
                "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
            ));
        }
        let accessor = |payload: &Option<Json>, role: &str| -> Result<Option<Option<Object>>, Value> {
            let Some(payload) = payload else {
                return Ok(None);
            };
            match self.codec.decode(realm, payload) {
                Value::Undefined => Ok(Some(None)),
                Value::Object(function) if function.is_callable() => Ok(Some(Some(function))),
                other => Err(realm.type_error(format!(
                    "{} must be a function: {}",
                    role,
                    other.describe()
                ))),
            }
        };
        Ok(PropertyDescriptor {
            value: attributes
                .value
                .as_ref()
                .map(|payload| self.codec.decode(realm, payload)),
            writable: attributes.writable,
            get: accessor(&attributes.get, "Getter")?,
            set: accessor(&attributes.set, "Setter")?,
            enumerable: attributes.enumerable,
            configurable: attributes.configurable,
        })
    }

    /// Encode a thrown value for the result message
    ///
    /// Error-like values become a marked envelope plus their own fields;
    /// anything else is encoded as itself.
    fn serialize_thrown(&self, thrown: &Value) -> Json {
        let Some(info) = self.realm.error_info(thrown) else {
            return match self.codec.encode(&self.realm, thrown) {
                Ok(encoded) => encoded.unwrap_or(Json::Null),
                Err(_) => Json::String(self.realm.to_string(thrown).unwrap_or_default()),
            };
        };
        let mut fields = Map::new();
        for (key, value) in &info.fields {
            match self.codec.encode(&self.realm, value) {
                Ok(Some(encoded)) => {
                    fields.insert(key.clone(), encoded);
                }
                Ok(None) => {}
                Err(_) => tracing::debug!(field = %key, "error field could not be encoded"),
            }
        }
        let envelope = ErrorEnvelope {
            name: Some(info.name),
            message: Some(info.message),
            stack: info.stack,
        };
        self.errors.serialize(&envelope, fields)
    }
}

/// Wait out pending results, including results that settle to pending results
async fn settle(mut value: Value) -> Result<Value, Value> {
    while let Value::Promise(promise) = value {
        value = promise.settle().await?;
    }
    Ok(value)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
