// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The realm: intrinsics plus the generic object operations
//!
//! Every operation a chain can replay has a method here with the host's
//! native semantics, including its behavior on primitive receivers.

use crate::builtins;
use crate::object::{NativeFunction, Object, ObjectClass, Property, PropertyDescriptor};
use crate::value::{format_number, Promise, Value};
use fp_core::{ErrorKind, PropertyKey};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Longest array that joins, JSON encoding and `slice` will walk
pub const MAX_WALK_LENGTH: u32 = 1 << 24;

pub(crate) struct Intrinsics {
    pub(crate) object_prototype: Object,
    pub(crate) function_prototype: Object,
    pub(crate) array_prototype: Object,
    pub(crate) string_prototype: Object,
    pub(crate) number_prototype: Object,
    pub(crate) boolean_prototype: Object,
    pub(crate) error_prototypes: Vec<(String, Object)>,
    pub(crate) global: Object,
}

/// What the error codec needs from an error-like value
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
    /// Own enumerable properties, in key order
    pub fields: Vec<(String, Value)>,
}

/// A set of intrinsics and the operations that run against them
///
/// Cheap to clone; clones share the same intrinsics.
#[derive(Clone)]
pub struct Realm {
    intrinsics: Arc<Intrinsics>,
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

impl Realm {
    pub fn new() -> Self {
        Self {
            intrinsics: Arc::new(builtins::create()),
        }
    }

    /// The global object: `Object`, `Array` and the error constructors
    pub fn global(&self) -> Object {
        self.intrinsics.global.clone()
    }

    pub fn object_prototype(&self) -> Object {
        self.intrinsics.object_prototype.clone()
    }

    pub fn function_prototype(&self) -> Object {
        self.intrinsics.function_prototype.clone()
    }

    pub fn array_prototype(&self) -> Object {
        self.intrinsics.array_prototype.clone()
    }

    /// Prototype for a named error kind; unknown names get `Error.prototype`
    pub fn error_prototype(&self, name: &str) -> Object {
        let prototypes = &self.intrinsics.error_prototypes;
        prototypes
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| prototypes.first())
            .map(|(_, prototype)| prototype.clone())
            .unwrap_or_else(|| self.object_prototype())
    }

    fn is_known_error(&self, name: &str) -> bool {
        self.intrinsics
            .error_prototypes
            .iter()
            .any(|(n, _)| n == name)
    }

    // -- construction --------------------------------------------------------

    pub fn new_object(&self) -> Object {
        Object::new(ObjectClass::Ordinary, Some(self.object_prototype()))
    }

    pub fn new_array(&self, items: Vec<Value>) -> Object {
        let array = Object::new(ObjectClass::Array, Some(self.array_prototype()));
        array.define_own_property(
            PropertyKey::from("length"),
            PropertyDescriptor {
                value: Some(Value::Number(0.0)),
                writable: Some(true),
                enumerable: Some(false),
                configurable: Some(false),
                ..PropertyDescriptor::default()
            },
        );
        for (index, item) in items.into_iter().enumerate() {
            array.define_own_property(PropertyKey::from(index), PropertyDescriptor::data(item));
        }
        array
    }

    /// Element values `0..length`, read through `get`
    pub fn array_elements(&self, array: &Object) -> Result<Vec<Value>, Value> {
        let target = Value::Object(array.clone());
        let length = self.walk_length(&target, "Invalid array length")?;
        let mut elements = Vec::new();
        for index in 0..length {
            elements.push(self.get(&target, &PropertyKey::from(index))?);
        }
        Ok(elements)
    }

    pub fn new_native(&self, function: NativeFunction) -> Object {
        builtins::function_object(&self.function_prototype(), function)
    }

    /// A callable, non-constructible host function
    pub fn new_function<F>(&self, name: &str, call: F) -> Object
    where
        F: Fn(&Realm, Value, Vec<Value>) -> Result<Value, Value> + Send + Sync + 'static,
    {
        self.new_native(NativeFunction {
            name: name.to_string(),
            call: Some(Arc::new(call)),
            construct: None,
        })
    }

    /// A host function whose call returns a pending result
    pub fn new_async_function<F>(&self, name: &str, call: F) -> Object
    where
        F: Fn(Realm, Value, Vec<Value>) -> BoxFuture<'static, Result<Value, Value>>
            + Send
            + Sync
            + 'static,
    {
        self.new_function(name, move |realm, this, args| {
            Ok(Value::Promise(Promise::new(call(realm.clone(), this, args))))
        })
    }

    /// A constructor with its own `prototype` object
    ///
    /// `init` runs against each fresh instance. Calling the constructor
    /// without `new` throws.
    pub fn new_class<F>(&self, name: &str, init: F) -> (Object, Object)
    where
        F: Fn(&Realm, &Object, Vec<Value>) -> Result<(), Value> + Send + Sync + 'static,
    {
        let prototype = self.new_object();
        let instance_prototype = prototype.clone();
        let class_name = name.to_string();
        let constructor = self.new_native(NativeFunction {
            name: name.to_string(),
            call: Some(Arc::new(move |realm: &Realm, _this: Value, _args: Vec<Value>| {
                Err(realm.type_error(format!(
                    "Class constructor {} cannot be invoked without 'new'",
                    class_name
                )))
            })),
            construct: Some(Arc::new(move |realm: &Realm, args: Vec<Value>| {
                let instance = Object::new(ObjectClass::Ordinary, Some(instance_prototype.clone()));
                init(realm, &instance, args)?;
                Ok(Value::Object(instance))
            })),
        });
        constructor.define_own_property(
            PropertyKey::from("prototype"),
            PropertyDescriptor {
                value: Some(Value::Object(prototype.clone())),
                writable: Some(true),
                enumerable: Some(false),
                configurable: Some(false),
                ..PropertyDescriptor::default()
            },
        );
        (constructor, prototype)
    }

    /// An error instance of the named kind
    pub fn new_error(&self, name: &str, message: &str) -> Value {
        let error = builtins::error_object(self, name, Some(message.to_string()));
        if !self.is_known_error(name) {
            error.define_own_property(PropertyKey::from("name"), PropertyDescriptor::hidden(name));
        }
        Value::Object(error)
    }

    pub fn type_error(&self, message: impl Into<String>) -> Value {
        self.new_error(ErrorKind::TypeError.name(), &message.into())
    }

    pub fn range_error(&self, message: impl Into<String>) -> Value {
        self.new_error(ErrorKind::RangeError.name(), &message.into())
    }

    pub fn reference_error(&self, message: impl Into<String>) -> Value {
        self.new_error(ErrorKind::ReferenceError.name(), &message.into())
    }

    // -- conversions ---------------------------------------------------------

    /// ToString
    pub fn to_string(&self, value: &Value) -> Result<String, Value> {
        self.to_string_guarded(value, &mut Vec::new())
    }

    fn to_string_guarded(&self, value: &Value, seen: &mut Vec<Object>) -> Result<String, Value> {
        Ok(match value {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Promise(_) => "[object Promise]".to_string(),
            Value::Object(object) => match object.class() {
                ObjectClass::Function(function) => {
                    format!("function {}() {{ [native code] }}", function.name)
                }
                ObjectClass::Array => {
                    if seen.iter().any(|o| o.ptr_eq(object)) {
                        return Ok(String::new());
                    }
                    seen.push(object.clone());
                    let joined = self.join_guarded(object, ",", seen);
                    seen.pop();
                    joined?
                }
                _ if self.is_error_like(object) => {
                    let name = self.to_string(&self.get(value, &PropertyKey::from("name"))?)?;
                    let message = match self.get(value, &PropertyKey::from("message"))? {
                        Value::Undefined => String::new(),
                        other => self.to_string(&other)?,
                    };
                    match (name.is_empty(), message.is_empty()) {
                        (_, true) => name,
                        (true, false) => message,
                        (false, false) => format!("{}: {}", name, message),
                    }
                }
                _ => "[object Object]".to_string(),
            },
        })
    }

    /// `Array.prototype.join` over any array-like object
    pub fn join(&self, array: &Object, separator: &str) -> Result<String, Value> {
        self.join_guarded(array, separator, &mut vec![array.clone()])
    }

    fn join_guarded(&self, array: &Object, separator: &str, seen: &mut Vec<Object>) -> Result<String, Value> {
        let target = Value::Object(array.clone());
        let length = self.walk_length(&target, "Invalid string length")?;
        let mut parts = Vec::new();
        for index in 0..length {
            let element = self.get(&target, &PropertyKey::from(index))?;
            parts.push(match element {
                Value::Undefined | Value::Null => String::new(),
                other => self.to_string_guarded(&other, seen)?,
            });
        }
        Ok(parts.join(separator))
    }

    /// ToLength of the receiver's `length`
    pub fn length_of(&self, target: &Value) -> Result<u32, Value> {
        Ok(match self.get(target, &PropertyKey::from("length"))? {
            Value::Number(n) if n.is_nan() || n <= 0.0 => 0,
            Value::Number(n) if n >= f64::from(u32::MAX) => u32::MAX,
            Value::Number(n) => n as u32,
            _ => 0,
        })
    }

    /// `length_of` for walks that visit every index; longer arrays throw
    /// a `RangeError` with `message`
    pub(crate) fn walk_length(&self, target: &Value, message: &str) -> Result<u32, Value> {
        let length = self.length_of(target)?;
        if length > MAX_WALK_LENGTH {
            return Err(self.range_error(message));
        }
        Ok(length)
    }

    /// Property key for a value, as the host coerces it
    pub fn to_property_key(&self, value: &Value) -> Result<PropertyKey, Value> {
        Ok(PropertyKey::from(self.to_string(value)?))
    }

    // -- generic operations --------------------------------------------------

    fn nullish_error(&self, target: &Value) -> Value {
        self.type_error(format!(
            "Cannot convert {} to object",
            target.describe()
        ))
    }

    /// Where property lookup starts for a value; primitives use their prototypes
    fn lookup_start(&self, target: &Value) -> Option<Object> {
        match target {
            Value::Object(object) => Some(object.clone()),
            Value::String(_) => Some(self.intrinsics.string_prototype.clone()),
            Value::Number(_) => Some(self.intrinsics.number_prototype.clone()),
            Value::Bool(_) => Some(self.intrinsics.boolean_prototype.clone()),
            Value::Promise(_) => Some(self.object_prototype()),
            Value::Undefined | Value::Null => None,
        }
    }

    /// `target[key]`
    pub fn get(&self, target: &Value, key: &PropertyKey) -> Result<Value, Value> {
        if let Value::String(s) = target {
            if let Some(value) = string_own_value(s, key) {
                return Ok(value);
            }
        }
        let Some(start) = self.lookup_start(target) else {
            return Err(self.type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                target.describe(),
                key
            )));
        };
        match start.find_property(key) {
            Some(Property::Data { value, .. }) => Ok(value),
            Some(Property::Accessor { get: Some(getter), .. }) => {
                self.call(&Value::Object(getter), target.clone(), Vec::new())
            }
            Some(Property::Accessor { get: None, .. }) | None => Ok(Value::Undefined),
        }
    }

    /// `target[key] = value`, throwing when the assignment is rejected
    pub fn set(&self, target: &Value, key: &PropertyKey, value: Value) -> Result<(), Value> {
        let object = match target {
            Value::Object(object) => object.clone(),
            Value::Undefined | Value::Null => {
                return Err(self.type_error(format!(
                    "Cannot set properties of {} (setting '{}')",
                    target.describe(),
                    key
                )))
            }
            primitive => {
                return Err(self.type_error(format!(
                    "Cannot create property '{}' on {} '{}'",
                    key,
                    primitive.type_of(),
                    self.to_string(primitive)?
                )))
            }
        };

        match object.find_property(key) {
            Some(Property::Accessor { set: Some(setter), .. }) => {
                self.call(&Value::Object(setter), target.clone(), vec![value])?;
                return Ok(());
            }
            Some(Property::Accessor { set: None, .. }) => {
                return Err(self.type_error(format!(
                    "Cannot set property {} of {} which has only a getter",
                    key,
                    target.describe()
                )))
            }
            Some(Property::Data { writable: false, .. }) => {
                return Err(self.type_error(format!(
                    "Cannot assign to read only property '{}' of object '{}'",
                    key,
                    target.describe()
                )))
            }
            Some(Property::Data { .. }) | None => {}
        }

        let desc = if object.has_own_property(key) {
            PropertyDescriptor {
                value: Some(value),
                ..PropertyDescriptor::default()
            }
        } else {
            PropertyDescriptor::data(value)
        };
        if object.define_own_property(key.clone(), desc) {
            return Ok(());
        }
        if !object.is_extensible() {
            return Err(self.type_error(format!(
                "Cannot add property {}, object is not extensible",
                key
            )));
        }
        Err(self.type_error(format!(
            "Cannot assign to property '{}' of {}",
            key,
            target.describe()
        )))
    }

    /// `delete target[key]`, throwing for non-configurable properties
    pub fn delete_property(&self, target: &Value, key: &PropertyKey) -> Result<(), Value> {
        match target {
            Value::Undefined | Value::Null => Err(self.nullish_error(target)),
            Value::Object(object) => {
                if object.delete(key) {
                    Ok(())
                } else {
                    Err(self.type_error(format!(
                        "Cannot delete property '{}' of {}",
                        key,
                        target.describe()
                    )))
                }
            }
            _ => Ok(()),
        }
    }

    /// `Object.defineProperty(target, key, desc)`
    pub fn define_property(
        &self,
        target: &Value,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> Result<(), Value> {
        let Value::Object(object) = target else {
            return Err(self.type_error("Object.defineProperty called on non-object"));
        };
        if object.define_own_property(key.clone(), desc) {
            return Ok(());
        }
        if !object.has_own_property(key) && !object.is_extensible() {
            return Err(self.type_error(format!(
                "Cannot define property {}, object is not extensible",
                key
            )));
        }
        Err(self.type_error(format!("Cannot redefine property: {}", key)))
    }

    /// `Object.getOwnPropertyDescriptor(target, key)`
    pub fn get_own_property_descriptor(&self, target: &Value, key: &PropertyKey) -> Result<Value, Value> {
        let property = match target {
            Value::Undefined | Value::Null => return Err(self.nullish_error(target)),
            Value::String(s) => string_own_value(s, key).map(|value| Property::Data {
                value,
                writable: false,
                enumerable: key.as_str() != "length",
                configurable: false,
            }),
            Value::Object(object) => object.get_own_property(key),
            _ => None,
        };
        Ok(match property {
            Some(property) => Value::Object(self.descriptor_object(property)),
            None => Value::Undefined,
        })
    }

    fn descriptor_object(&self, property: Property) -> Object {
        let descriptor = self.new_object();
        let put = |name: &str, value: Value| {
            descriptor.define_own_property(PropertyKey::from(name), PropertyDescriptor::data(value));
        };
        match property {
            Property::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => {
                put("value", value);
                put("writable", Value::Bool(writable));
                put("enumerable", Value::Bool(enumerable));
                put("configurable", Value::Bool(configurable));
            }
            Property::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => {
                put("get", get.map(Value::Object).unwrap_or(Value::Undefined));
                put("set", set.map(Value::Object).unwrap_or(Value::Undefined));
                put("enumerable", Value::Bool(enumerable));
                put("configurable", Value::Bool(configurable));
            }
        }
        descriptor
    }

    /// `Object.getPrototypeOf(target)`
    pub fn get_prototype_of(&self, target: &Value) -> Result<Value, Value> {
        match target {
            Value::Undefined | Value::Null => Err(self.nullish_error(target)),
            Value::Object(object) => Ok(object.prototype().map(Value::Object).unwrap_or(Value::Null)),
            primitive => Ok(self
                .lookup_start(primitive)
                .map(Value::Object)
                .unwrap_or(Value::Null)),
        }
    }

    /// `Object.setPrototypeOf(target, prototype)`; returns `target`
    pub fn set_prototype_of(&self, target: &Value, prototype: &Value) -> Result<Value, Value> {
        if target.is_nullish() {
            return Err(self.type_error("Object.setPrototypeOf called on null or undefined"));
        }
        let prototype = match prototype {
            Value::Object(object) => Some(object.clone()),
            Value::Null => None,
            other => {
                return Err(self.type_error(format!(
                    "Object prototype may only be an Object or null: {}",
                    other.describe()
                )))
            }
        };
        let Value::Object(object) = target else {
            return Ok(target.clone());
        };
        if object.set_prototype(prototype) {
            return Ok(target.clone());
        }
        if !object.is_extensible() {
            return Err(self.type_error(format!("{} is not extensible", target.describe())));
        }
        Err(self.type_error("Cyclic __proto__ value"))
    }

    /// `key in target`
    pub fn has(&self, target: &Value, key: &PropertyKey) -> Result<bool, Value> {
        match target {
            Value::Object(object) => Ok(object.find_property(key).is_some()),
            other => Err(self.type_error(format!(
                "Cannot use 'in' operator to search for '{}' in {}",
                key,
                other.describe()
            ))),
        }
    }

    /// `Object.isExtensible(target)`; primitives are never extensible
    pub fn is_extensible(&self, target: &Value) -> bool {
        match target {
            Value::Object(object) => object.is_extensible(),
            _ => false,
        }
    }

    /// `Reflect.ownKeys(target)` as an array of key strings
    pub fn own_keys(&self, target: &Value) -> Result<Value, Value> {
        let Value::Object(object) = target else {
            return Err(self.type_error("Reflect.ownKeys called on non-object"));
        };
        let keys = object
            .own_keys()
            .into_iter()
            .map(|key| Value::String(key.as_str().to_string()))
            .collect();
        Ok(Value::Object(self.new_array(keys)))
    }

    /// `Object.preventExtensions(target)`; returns `target`
    pub fn prevent_extensions(&self, target: &Value) -> Result<Value, Value> {
        if let Value::Object(object) = target {
            object.prevent_extensions();
        }
        Ok(target.clone())
    }

    /// Call `callee` with `this` bound to `receiver`
    pub fn call(&self, callee: &Value, receiver: Value, args: Vec<Value>) -> Result<Value, Value> {
        let call = callee
            .as_object()
            .and_then(|object| object.function())
            .and_then(|function| function.call.clone());
        match call {
            Some(call) => call(self, receiver, args),
            None => Err(self.type_error(format!("{} is not a function", callee.describe()))),
        }
    }

    /// `new callee(...args)`
    pub fn construct(&self, callee: &Value, args: Vec<Value>) -> Result<Value, Value> {
        let construct = callee
            .as_object()
            .and_then(|object| object.function())
            .and_then(|function| function.construct.clone());
        match construct {
            Some(construct) => construct(self, args),
            None => Err(self.type_error(format!("{} is not a constructor", callee.describe()))),
        }
    }

    fn is_error_like(&self, object: &Object) -> bool {
        let error_prototype = self.error_prototype(ErrorKind::Error.name());
        object.is_error() || object.ptr_eq(&error_prototype) || object.inherits_from(&error_prototype)
    }

    /// Name, message, stack and own enumerable fields of an error-like value
    pub fn error_info(&self, value: &Value) -> Option<ErrorInfo> {
        let object = value.as_object()?;
        if !self.is_error_like(object) {
            return None;
        }

        let read = |key: &str| -> Option<String> {
            match self.get(value, &PropertyKey::from(key)) {
                Ok(Value::Undefined) | Err(_) => None,
                Ok(other) => self.to_string(&other).ok(),
            }
        };
        let stack = match object.get_own_property(&PropertyKey::from("stack")) {
            Some(Property::Data {
                value: Value::String(stack),
                ..
            }) => Some(stack),
            _ => None,
        };
        let fields = object
            .own_keys()
            .into_iter()
            .filter(|key| {
                object
                    .get_own_property(key)
                    .is_some_and(|property| property.is_enumerable())
            })
            .filter_map(|key| {
                self.get(value, &key)
                    .ok()
                    .map(|v| (key.as_str().to_string(), v))
            })
            .collect();

        Some(ErrorInfo {
            name: read("name").unwrap_or_else(|| ErrorKind::Error.name().to_string()),
            message: read("message").unwrap_or_default(),
            stack,
            fields,
        })
    }
}

/// Own `length` and indexed characters of a string primitive (UTF-16 units)
fn string_own_value(s: &str, key: &PropertyKey) -> Option<Value> {
    if key.as_str() == "length" {
        return Some(Value::Number(s.encode_utf16().count() as f64));
    }
    let index = key.as_index()? as usize;
    let unit = s.encode_utf16().nth(index)?;
    Some(Value::String(String::from_utf16_lossy(&[unit])))
}

#[cfg(test)]
#[path = "realm_tests.rs"]
mod tests;
