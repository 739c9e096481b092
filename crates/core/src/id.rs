// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commit ids
//!
//! A committer correlates results by id alone, so an id must never repeat
//! while its commit is pending.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of commit ids for one committer
pub trait IdGen: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().as_hyphenated().to_string()
    }
}

/// `prefix-1`, `prefix-2`, ... for tests that assert on the wire
#[derive(Debug)]
pub struct SequentialIdGen {
    prefix: String,
    issued: AtomicU64,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: AtomicU64::new(0),
        }
    }

    /// How many ids have been handed out
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}

impl IdGen for SequentialIdGen {
    fn next_id(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
