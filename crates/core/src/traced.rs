// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing support for replayed operations

use crate::operation::Operation;

/// Trait for steps that should be traced
///
/// Provides consistent naming and structured fields for logging.
pub trait TracedOperation {
    /// Step name for log records (e.g., "get", "apply")
    fn name(&self) -> &'static str;

    /// Key-value pairs for structured logging
    fn fields(&self) -> Vec<(&'static str, String)>;
}

impl TracedOperation for Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Apply { .. } => "apply",
            Operation::Construct { .. } => "construct",
            Operation::DefineProperty { .. } => "define_property",
            Operation::DeleteProperty { .. } => "delete_property",
            Operation::Get { .. } => "get",
            Operation::GetOwnPropertyDescriptor { .. } => "get_own_property_descriptor",
            Operation::GetPrototypeOf => "get_prototype_of",
            Operation::Has { .. } => "has",
            Operation::IsExtensible => "is_extensible",
            Operation::OwnKeys => "own_keys",
            Operation::PreventExtensions => "prevent_extensions",
            Operation::Set { .. } => "set",
            Operation::SetPrototypeOf { .. } => "set_prototype_of",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(property) = self.property() {
            fields.push(("property", property.to_string()));
        }
        match self {
            Operation::Apply { arg_array } | Operation::Construct { arg_array } => {
                fields.push(("args", arg_array.len().to_string()));
            }
            Operation::SetPrototypeOf { prototype } => {
                fields.push(("prototype_null", prototype.is_null().to_string()));
            }
            Operation::DefineProperty { attributes, .. } => {
                fields.push(("accessor", attributes.is_accessor().to_string()));
            }
            _ => {}
        }
        fields
    }
}
