// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Root resolution: turning a commit's optional key into a value

use async_trait::async_trait;
use fp_realm::{Realm, Value};
use std::collections::HashMap;
use std::future::Future;

/// Looks up the value a chain starts from
///
/// Called once per commit before any operation runs. Unknown keys must
/// throw rather than produce a placeholder.
#[async_trait]
pub trait RootResolver: Send + Sync + 'static {
    async fn resolve(&self, realm: &Realm, key: Option<&str>) -> Result<Value, Value>;
}

fn unknown_key(realm: &Realm, key: &str) -> Value {
    realm.reference_error(format!("unknown root key: {}", key))
}

/// A single exported root; named lookups fail
#[derive(Debug, Clone)]
pub struct FixedRoot(pub Value);

#[async_trait]
impl RootResolver for FixedRoot {
    async fn resolve(&self, realm: &Realm, key: Option<&str>) -> Result<Value, Value> {
        match key {
            None => Ok(self.0.clone()),
            Some(key) => Err(unknown_key(realm, key)),
        }
    }
}

/// Named roots, plus an optional root for unnamed chains
#[derive(Debug, Clone, Default)]
pub struct RootTable {
    default: Option<Value>,
    named: HashMap<String, Value>,
}

impl RootTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, root: Value) -> Self {
        self.default = Some(root);
        self
    }

    pub fn with(mut self, key: impl Into<String>, root: Value) -> Self {
        self.insert(key, root);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, root: Value) -> Option<Value> {
        self.named.insert(key.into(), root)
    }

    pub fn len(&self) -> usize {
        self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.default.is_none()
    }
}

#[async_trait]
impl RootResolver for RootTable {
    async fn resolve(&self, realm: &Realm, key: Option<&str>) -> Result<Value, Value> {
        let found = match key {
            None => self.default.clone(),
            Some(key) => self.named.get(key).cloned(),
        };
        found.ok_or_else(|| match key {
            Some(key) => unknown_key(realm, key),
            None => realm.reference_error("no default root is exported"),
        })
    }
}

/// A resolver backed by an async closure
pub struct FnResolver<F> {
    resolve: F,
}

/// Wrap `f(realm, key)` as a [`RootResolver`]
pub fn resolver_fn<F, Fut>(f: F) -> FnResolver<F>
where
    F: Fn(Realm, Option<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, Value>> + Send + 'static,
{
    FnResolver { resolve: f }
}

#[async_trait]
impl<F, Fut> RootResolver for FnResolver<F>
where
    F: Fn(Realm, Option<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, Value>> + Send + 'static,
{
    async fn resolve(&self, realm: &Realm, key: Option<&str>) -> Result<Value, Value> {
        (self.resolve)(realm.clone(), key.map(str::to_string)).await
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
