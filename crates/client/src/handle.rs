// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chain recorder
//!
//! A [`Handle`] is inert: it only describes operations to run remotely.
//! Appending never touches an existing handle, so two branches from the
//! same handle share the recorded prefix and nothing else.

use fp_adapters::{Channel, ChannelId};
use fp_core::{Operation, PropertyAttributes, PropertyKey};
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

/// The remote root a chain targets and the channel it travels over
pub(crate) struct Binding {
    pub(crate) channel: Arc<dyn Channel>,
    pub(crate) root_key: Option<String>,
}

/// One recorded step, linked to everything recorded before it
struct Link {
    operation: Operation,
    parent: Option<Arc<Link>>,
}

/// A deferred chain of operations against a remote root
#[derive(Clone)]
pub struct Handle {
    binding: Arc<Binding>,
    tail: Option<Arc<Link>>,
    len: usize,
}

/// Handle for the channel's exported root
pub fn import<C: Channel>(channel: C) -> Handle {
    Handle::root(Arc::new(channel), None)
}

/// Handle for a remote root selected by `key`
pub fn import_named<C: Channel>(channel: C, key: impl Into<String>) -> Handle {
    Handle::root(Arc::new(channel), Some(key.into()))
}

impl Handle {
    pub(crate) fn root(channel: Arc<dyn Channel>, root_key: Option<String>) -> Self {
        Self {
            binding: Arc::new(Binding { channel, root_key }),
            tail: None,
            len: 0,
        }
    }

    fn append(&self, operation: Operation) -> Self {
        Self {
            binding: Arc::clone(&self.binding),
            tail: Some(Arc::new(Link {
                operation,
                parent: self.tail.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub(crate) fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Identity of the channel this handle commits over
    pub fn channel_id(&self) -> ChannelId {
        self.binding.channel.id()
    }

    pub fn root_key(&self) -> Option<&str> {
        self.binding.root_key.as_deref()
    }

    /// Whether both handles target the same root over the same channel
    pub fn same_root(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.binding, &other.binding)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The recorded operations, oldest first
    pub fn operations(&self) -> Vec<Operation> {
        let mut operations = Vec::with_capacity(self.len);
        let mut cursor = self.tail.as_deref();
        while let Some(link) = cursor {
            operations.push(link.operation.clone());
            cursor = link.parent.as_deref();
        }
        operations.reverse();
        operations
    }

    pub fn apply(&self, args: Vec<Json>) -> Self {
        self.append(Operation::Apply { arg_array: args })
    }

    pub fn construct(&self, args: Vec<Json>) -> Self {
        self.append(Operation::Construct { arg_array: args })
    }

    pub fn define_property(&self, property: impl Into<PropertyKey>, attributes: PropertyAttributes) -> Self {
        self.append(Operation::DefineProperty {
            property: property.into(),
            attributes,
        })
    }

    pub fn delete_property(&self, property: impl Into<PropertyKey>) -> Self {
        self.append(Operation::DeleteProperty {
            property: property.into(),
        })
    }

    pub fn get(&self, property: impl Into<PropertyKey>) -> Self {
        self.append(Operation::Get {
            property: property.into(),
        })
    }

    pub fn get_own_property_descriptor(&self, property: impl Into<PropertyKey>) -> Self {
        self.append(Operation::GetOwnPropertyDescriptor {
            property: property.into(),
        })
    }

    pub fn get_prototype_of(&self) -> Self {
        self.append(Operation::GetPrototypeOf)
    }

    pub fn has(&self, property: impl Into<PropertyKey>) -> Self {
        self.append(Operation::Has {
            property: property.into(),
        })
    }

    pub fn is_extensible(&self) -> Self {
        self.append(Operation::IsExtensible)
    }

    pub fn own_keys(&self) -> Self {
        self.append(Operation::OwnKeys)
    }

    pub fn prevent_extensions(&self) -> Self {
        self.append(Operation::PreventExtensions)
    }

    pub fn set(&self, property: impl Into<PropertyKey>, value: impl Into<Json>) -> Self {
        self.append(Operation::Set {
            property: property.into(),
            new_value: value.into(),
        })
    }

    /// `prototype` must be an object payload or `null`
    pub fn set_prototype_of(&self, prototype: impl Into<Json>) -> Self {
        self.append(Operation::SetPrototypeOf {
            prototype: prototype.into(),
        })
    }

    /// `Get(method)` followed by `Apply(args)`: a method call on the current value
    pub fn call(&self, method: impl Into<PropertyKey>, args: Vec<Json>) -> Self {
        self.get(method).apply(args)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("channel", &self.channel_id())
            .field("root_key", &self.binding.root_key)
            .field("operations", &self.operations())
            .finish()
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
