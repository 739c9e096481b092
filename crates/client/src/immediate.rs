// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-step queries that commit at once
//!
//! Each helper appends a single operation to `handle` and commits the
//! result, for callers who want an answer now rather than a longer chain.

use crate::committer::commit;
use crate::error::CommitError;
use crate::handle::Handle;
use fp_core::{PropertyAttributes, PropertyKey};
use serde_json::Value as Json;

/// `key in value`
pub async fn has(handle: &Handle, key: impl Into<PropertyKey>) -> Result<bool, CommitError> {
    commit(&handle.has(key))?.decode().await
}

/// Own property keys, indices first
pub async fn own_keys(handle: &Handle) -> Result<Vec<String>, CommitError> {
    commit(&handle.own_keys())?.decode().await
}

pub async fn is_extensible(handle: &Handle) -> Result<bool, CommitError> {
    commit(&handle.is_extensible())?.decode().await
}

/// The own property's attributes, `None` when there is no such property
pub async fn get_own_property_descriptor(
    handle: &Handle,
    key: impl Into<PropertyKey>,
) -> Result<Option<PropertyAttributes>, CommitError> {
    commit(&handle.get_own_property_descriptor(key))?.decode().await
}

/// `value[key]`; `None` for `undefined`
pub async fn get(handle: &Handle, key: impl Into<PropertyKey>) -> Result<Option<Json>, CommitError> {
    Ok(commit(&handle.get(key))?.await?)
}

#[cfg(test)]
#[path = "immediate_tests.rs"]
mod tests;
