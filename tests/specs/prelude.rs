// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup for the end-to-end specs

#![allow(dead_code, unused_imports)]

pub use fp_adapters::{Channel, MemoryChannel};
pub use fp_client::{commit, commit_with, immediate, import, import_named, CommitError, CommitOptions, Handle};
pub use fp_core::{ErrorKind, PropertyAttributes};
pub use fp_realm::{PropertyDescriptor, PropertyKey, Realm, Value};
pub use fp_server::{export, listen, resolver_fn, Listener, RootTable};
pub use serde_json::{json, Value as Json};

/// A client endpoint whose peer exports `root`
pub fn serve(realm: &Realm, root: Value) -> MemoryChannel {
    let (client, server) = MemoryChannel::pair();
    export(server, realm.clone(), root).unwrap();
    client
}

/// A client endpoint whose peer exports the JSON value `root`
pub fn serve_json(root: Json) -> MemoryChannel {
    let realm = Realm::new();
    let value = realm.from_json(&root);
    serve(&realm, value)
}

/// Define an enumerable data property on `object`
pub fn put(object: &fp_realm::Object, key: &str, value: impl Into<Value>) {
    object.define_own_property(PropertyKey::from(key), PropertyDescriptor::data(value));
}

/// Commit `handle` and wait for its return value
pub async fn run(handle: &Handle) -> Result<Option<Json>, CommitError> {
    commit(handle)?.await
}
