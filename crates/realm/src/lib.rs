// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Host object model that replayed chains run against
//!
//! Values, objects with property descriptors and prototypes, native
//! functions (sync and async), and the intrinsics a realm starts with.
//! Mutations follow strict-mode rules: a rejected write throws.

mod builtins;
mod json;
mod object;
mod realm;
mod value;

pub use fp_core::PropertyKey;
pub use object::{
    NativeCall, NativeConstruct, NativeFunction, Object, ObjectClass, Property, PropertyDescriptor,
};
pub use realm::{ErrorInfo, Realm, MAX_WALK_LENGTH};
pub use value::{format_number, Promise, Value};
