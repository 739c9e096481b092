// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Objects, property descriptors and the ordinary internal methods
//!
//! Own properties keep insertion order; [`Object::own_keys`] reports array
//! indices first in ascending order, then the remaining keys as inserted.

use crate::realm::Realm;
use crate::value::Value;
use fp_core::PropertyKey;
use std::sync::{Arc, Mutex, MutexGuard};

/// Native call behavior: `(realm, receiver, arguments)`
pub type NativeCall = dyn Fn(&Realm, Value, Vec<Value>) -> Result<Value, Value> + Send + Sync;

/// Native construct behavior: `(realm, arguments)`
pub type NativeConstruct = dyn Fn(&Realm, Vec<Value>) -> Result<Value, Value> + Send + Sync;

/// A function implemented by the host
pub struct NativeFunction {
    pub name: String,
    pub call: Option<Arc<NativeCall>>,
    pub construct: Option<Arc<NativeConstruct>>,
}

/// What kind of exotic behavior an object has
#[derive(Clone)]
pub enum ObjectClass {
    Ordinary,
    /// Keeps `length` in step with its index keys
    Array,
    Error,
    Function(Arc<NativeFunction>),
}

/// A stored own property
#[derive(Clone, Debug)]
pub enum Property {
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<Object>,
        set: Option<Object>,
        enumerable: bool,
        configurable: bool,
    },
}

impl Property {
    pub fn is_enumerable(&self) -> bool {
        match self {
            Property::Data { enumerable, .. } | Property::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            Property::Data { configurable, .. } | Property::Accessor { configurable, .. } => {
                *configurable
            }
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, Property::Accessor { .. })
    }
}

/// A partial descriptor, as passed to `defineProperty`
///
/// `get`/`set` use `Some(None)` for an explicitly undefined accessor half.
#[derive(Clone, Debug, Default)]
pub struct PropertyDescriptor {
    pub value: Option<Value>,
    pub writable: Option<bool>,
    pub get: Option<Option<Object>>,
    pub set: Option<Option<Object>>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Writable, enumerable, configurable data property
    pub fn data(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(true),
            ..Self::default()
        }
    }

    /// Writable, configurable, non-enumerable data property (built-in methods)
    pub fn hidden(value: impl Into<Value>) -> Self {
        Self {
            enumerable: Some(false),
            ..Self::data(value)
        }
    }

    /// Non-writable, non-enumerable, non-configurable data property
    pub fn frozen(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            writable: Some(false),
            enumerable: Some(false),
            configurable: Some(false),
            ..Self::default()
        }
    }

    pub fn accessor(get: Option<Object>, set: Option<Object>) -> Self {
        Self {
            get: Some(get),
            set: Some(set),
            enumerable: Some(true),
            configurable: Some(true),
            ..Self::default()
        }
    }

    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_data(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    fn into_property(self) -> Property {
        if self.is_accessor() {
            Property::Accessor {
                get: self.get.flatten(),
                set: self.set.flatten(),
                enumerable: self.enumerable.unwrap_or(false),
                configurable: self.configurable.unwrap_or(false),
            }
        } else {
            Property::Data {
                value: self.value.unwrap_or(Value::Undefined),
                writable: self.writable.unwrap_or(false),
                enumerable: self.enumerable.unwrap_or(false),
                configurable: self.configurable.unwrap_or(false),
            }
        }
    }
}

pub(crate) struct ObjectData {
    class: ObjectClass,
    prototype: Option<Object>,
    extensible: bool,
    properties: Vec<(PropertyKey, Property)>,
}

impl ObjectData {
    fn find(&self, key: &PropertyKey) -> Option<usize> {
        self.properties.iter().position(|(k, _)| k == key)
    }

    fn array_length(&self) -> u32 {
        let length = PropertyKey::from("length");
        match self.find(&length).map(|i| &self.properties[i].1) {
            Some(Property::Data {
                value: Value::Number(n),
                ..
            }) => *n as u32,
            _ => 0,
        }
    }

    fn length_writable(&self) -> bool {
        let length = PropertyKey::from("length");
        matches!(
            self.find(&length).map(|i| &self.properties[i].1),
            Some(Property::Data { writable: true, .. })
        )
    }

    /// ValidateAndApplyPropertyDescriptor for ordinary objects
    fn define_ordinary(&mut self, key: PropertyKey, desc: PropertyDescriptor) -> bool {
        let Some(index) = self.find(&key) else {
            if !self.extensible {
                return false;
            }
            self.properties.push((key, desc.into_property()));
            return true;
        };

        let current = &self.properties[index].1;
        if !current.is_configurable() {
            if desc.configurable == Some(true) {
                return false;
            }
            if let Some(enumerable) = desc.enumerable {
                if enumerable != current.is_enumerable() {
                    return false;
                }
            }
            if (desc.is_accessor() && !current.is_accessor())
                || (desc.is_data() && current.is_accessor())
            {
                return false;
            }
            match current {
                Property::Accessor { get, set, .. } => {
                    if let Some(new_get) = &desc.get {
                        if !same_object(new_get, get) {
                            return false;
                        }
                    }
                    if let Some(new_set) = &desc.set {
                        if !same_object(new_set, set) {
                            return false;
                        }
                    }
                }
                Property::Data {
                    value, writable, ..
                } => {
                    if !writable {
                        if desc.writable == Some(true) {
                            return false;
                        }
                        if let Some(new_value) = &desc.value {
                            if !new_value.same_value(value) {
                                return false;
                            }
                        }
                    }
                }
            }
        }

        let current = self.properties[index].1.clone();
        let updated = match current {
            Property::Data {
                value,
                writable,
                enumerable,
                configurable,
            } if !desc.is_accessor() => Property::Data {
                value: desc.value.unwrap_or(value),
                writable: desc.writable.unwrap_or(writable),
                enumerable: desc.enumerable.unwrap_or(enumerable),
                configurable: desc.configurable.unwrap_or(configurable),
            },
            Property::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } if !desc.is_data() => Property::Accessor {
                get: desc.get.unwrap_or(get),
                set: desc.set.unwrap_or(set),
                enumerable: desc.enumerable.unwrap_or(enumerable),
                configurable: desc.configurable.unwrap_or(configurable),
            },
            // Switching between data and accessor keeps only the shared attributes
            other => PropertyDescriptor {
                enumerable: Some(desc.enumerable.unwrap_or(other.is_enumerable())),
                configurable: Some(desc.configurable.unwrap_or(other.is_configurable())),
                ..desc
            }
            .into_property(),
        };
        self.properties[index].1 = updated;
        true
    }

    fn define_array_length(&mut self, desc: PropertyDescriptor) -> bool {
        let Some(value) = desc.value.clone() else {
            return self.define_ordinary(PropertyKey::from("length"), desc);
        };
        let new_length = match value {
            Value::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => n as u32,
            _ => return false,
        };
        let old_length = self.array_length();
        if new_length < old_length {
            if !self.length_writable() {
                return false;
            }
            let blocked = self.properties.iter().any(|(k, p)| {
                k.as_index().is_some_and(|i| i >= new_length) && !p.is_configurable()
            });
            if blocked {
                return false;
            }
            self.properties
                .retain(|(k, _)| k.as_index().map_or(true, |i| i < new_length));
        }
        self.define_ordinary(
            PropertyKey::from("length"),
            PropertyDescriptor {
                value: Some(Value::Number(f64::from(new_length))),
                ..desc
            },
        )
    }

    fn define_array_index(&mut self, key: PropertyKey, index: u32, desc: PropertyDescriptor) -> bool {
        let length = self.array_length();
        if index >= length && !self.length_writable() {
            return false;
        }
        if !self.define_ordinary(key, desc) {
            return false;
        }
        if index >= length {
            let length_key = PropertyKey::from("length");
            if let Some(i) = self.find(&length_key) {
                if let Property::Data { value, .. } = &mut self.properties[i].1 {
                    *value = Value::Number(f64::from(index) + 1.0);
                }
            }
        }
        true
    }
}

fn same_object(a: &Option<Object>, b: &Option<Object>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.ptr_eq(b),
        _ => false,
    }
}

/// A shared, mutable host object
#[derive(Clone)]
pub struct Object(Arc<Mutex<ObjectData>>);

impl Object {
    pub fn new(class: ObjectClass, prototype: Option<Object>) -> Self {
        Self(Arc::new(Mutex::new(ObjectData {
            class,
            prototype,
            extensible: true,
            properties: Vec::new(),
        })))
    }

    fn data(&self) -> MutexGuard<'_, ObjectData> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn class(&self) -> ObjectClass {
        self.data().class.clone()
    }

    pub fn is_array(&self) -> bool {
        matches!(self.data().class, ObjectClass::Array)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.data().class, ObjectClass::Error)
    }

    pub fn function(&self) -> Option<Arc<NativeFunction>> {
        match &self.data().class {
            ObjectClass::Function(function) => Some(Arc::clone(function)),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.function().is_some_and(|f| f.call.is_some())
    }

    pub fn is_constructor(&self) -> bool {
        self.function().is_some_and(|f| f.construct.is_some())
    }

    pub fn prototype(&self) -> Option<Object> {
        self.data().prototype.clone()
    }

    /// `[[SetPrototypeOf]]`: fails on non-extensible objects and cycles
    pub fn set_prototype(&self, prototype: Option<Object>) -> bool {
        let current = self.prototype();
        if same_object(&current, &prototype) {
            return true;
        }
        if !self.is_extensible() {
            return false;
        }
        let mut cursor = prototype.clone();
        while let Some(link) = cursor {
            if link.ptr_eq(self) {
                return false;
            }
            cursor = link.prototype();
        }
        self.data().prototype = prototype;
        true
    }

    pub fn is_extensible(&self) -> bool {
        self.data().extensible
    }

    pub fn prevent_extensions(&self) -> bool {
        self.data().extensible = false;
        true
    }

    pub fn get_own_property(&self, key: &PropertyKey) -> Option<Property> {
        let data = self.data();
        data.find(key).map(|i| data.properties[i].1.clone())
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.data().find(key).is_some()
    }

    /// `[[DefineOwnProperty]]`; `false` when the change is not allowed
    pub fn define_own_property(&self, key: PropertyKey, desc: PropertyDescriptor) -> bool {
        let mut data = self.data();
        if matches!(data.class, ObjectClass::Array) {
            if key.as_str() == "length" {
                return data.define_array_length(desc);
            }
            if let Some(index) = key.as_index() {
                return data.define_array_index(key, index, desc);
            }
        }
        data.define_ordinary(key, desc)
    }

    /// `[[Delete]]`; `false` for non-configurable properties
    pub fn delete(&self, key: &PropertyKey) -> bool {
        let mut data = self.data();
        match data.find(key) {
            Some(index) if !data.properties[index].1.is_configurable() => false,
            Some(index) => {
                data.properties.remove(index);
                true
            }
            None => true,
        }
    }

    /// `[[OwnPropertyKeys]]`
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let data = self.data();
        let mut indices: Vec<(u32, PropertyKey)> = Vec::new();
        let mut names: Vec<PropertyKey> = Vec::new();
        for (key, _) in &data.properties {
            match key.as_index() {
                Some(index) => indices.push((index, key.clone())),
                None => names.push(key.clone()),
            }
        }
        indices.sort_by_key(|(index, _)| *index);
        indices.into_iter().map(|(_, key)| key).chain(names).collect()
    }

    /// Current `length` of an array object
    pub fn array_length(&self) -> u32 {
        self.data().array_length()
    }

    /// Look `key` up along the prototype chain, starting at this object
    pub fn find_property(&self, key: &PropertyKey) -> Option<Property> {
        let mut cursor = Some(self.clone());
        while let Some(object) = cursor {
            if let Some(property) = object.get_own_property(key) {
                return Some(property);
            }
            cursor = object.prototype();
        }
        None
    }

    /// Whether `ancestor` is on this object's prototype chain
    pub fn inherits_from(&self, ancestor: &Object) -> bool {
        let mut cursor = self.prototype();
        while let Some(object) = cursor {
            if object.ptr_eq(ancestor) {
                return true;
            }
            cursor = object.prototype();
        }
        false
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&Value::Object(self.clone()).describe())
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
