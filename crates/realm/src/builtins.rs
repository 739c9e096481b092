// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intrinsic objects every realm starts with

use crate::object::{NativeFunction, Object, ObjectClass, PropertyDescriptor};
use crate::realm::{Intrinsics, Realm, MAX_WALK_LENGTH};
use crate::value::Value;
use fp_core::{ErrorKind, PropertyKey};
use std::sync::Arc;

const STACK_FRAME: &str = "    at <replay>";

pub(crate) fn function_object(function_prototype: &Object, function: NativeFunction) -> Object {
    let name = function.name.clone();
    let object = Object::new(
        ObjectClass::Function(Arc::new(function)),
        Some(function_prototype.clone()),
    );
    object.define_own_property(
        PropertyKey::from("name"),
        PropertyDescriptor {
            value: Some(Value::String(name)),
            writable: Some(false),
            enumerable: Some(false),
            configurable: Some(true),
            ..PropertyDescriptor::default()
        },
    );
    object
}

/// An error instance with a non-enumerable `message` and `stack`
pub(crate) fn error_object(realm: &Realm, name: &str, message: Option<String>) -> Object {
    let error = Object::new(ObjectClass::Error, Some(realm.error_prototype(name)));
    let header = match &message {
        Some(message) if !message.is_empty() => format!("{}: {}", name, message),
        _ => name.to_string(),
    };
    if let Some(message) = message {
        error.define_own_property(PropertyKey::from("message"), PropertyDescriptor::hidden(message));
    }
    error.define_own_property(
        PropertyKey::from("stack"),
        PropertyDescriptor::hidden(format!("{}\n{}", header, STACK_FRAME)),
    );
    error
}

struct Builder {
    function_prototype: Object,
}

impl Builder {
    fn function<F>(&self, name: &str, call: F) -> Object
    where
        F: Fn(&Realm, Value, Vec<Value>) -> Result<Value, Value> + Send + Sync + 'static,
    {
        function_object(
            &self.function_prototype,
            NativeFunction {
                name: name.to_string(),
                call: Some(Arc::new(call)),
                construct: None,
            },
        )
    }

    /// Install a non-enumerable method on `target`
    fn method<F>(&self, target: &Object, name: &str, call: F)
    where
        F: Fn(&Realm, Value, Vec<Value>) -> Result<Value, Value> + Send + Sync + 'static,
    {
        let function = self.function(name, call);
        target.define_own_property(PropertyKey::from(name), PropertyDescriptor::hidden(function));
    }

    /// A constructor whose call and construct behave the same
    fn constructor<F>(&self, name: &str, prototype: &Object, build: F) -> Object
    where
        F: Fn(&Realm, Vec<Value>) -> Result<Value, Value> + Send + Sync + 'static,
    {
        let build = Arc::new(build);
        let construct = Arc::clone(&build);
        let constructor = function_object(
            &self.function_prototype,
            NativeFunction {
                name: name.to_string(),
                call: Some(Arc::new(move |realm: &Realm, _this: Value, args: Vec<Value>| {
                    build(realm, args)
                })),
                construct: Some(Arc::new(move |realm: &Realm, args: Vec<Value>| {
                    construct(realm, args)
                })),
            },
        );
        constructor.define_own_property(
            PropertyKey::from("prototype"),
            PropertyDescriptor {
                value: Some(Value::Object(prototype.clone())),
                writable: Some(false),
                enumerable: Some(false),
                configurable: Some(false),
                ..PropertyDescriptor::default()
            },
        );
        constructor
    }
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

/// ToIntegerOrInfinity, clamped to `0..=length` with negative offsets from the end
fn relative_index(realm: &Realm, value: &Value, length: u32, default: u32) -> Result<u32, Value> {
    let n = match value {
        Value::Undefined => return Ok(default),
        Value::Number(n) => *n,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        other => realm.to_string(other)?.trim().parse::<f64>().unwrap_or(f64::NAN),
    };
    let n = if n.is_nan() { 0.0 } else { n.trunc() };
    let length = f64::from(length);
    let resolved = if n < 0.0 { (length + n).max(0.0) } else { n.min(length) };
    Ok(resolved as u32)
}

pub(crate) fn create() -> Intrinsics {
    let object_prototype = Object::new(ObjectClass::Ordinary, None);
    let function_prototype = Object::new(ObjectClass::Ordinary, Some(object_prototype.clone()));
    let array_prototype = Object::new(ObjectClass::Array, Some(object_prototype.clone()));
    array_prototype.define_own_property(
        PropertyKey::from("length"),
        PropertyDescriptor {
            value: Some(Value::Number(0.0)),
            writable: Some(true),
            enumerable: Some(false),
            configurable: Some(false),
            ..PropertyDescriptor::default()
        },
    );
    let string_prototype = Object::new(ObjectClass::Ordinary, Some(object_prototype.clone()));
    let number_prototype = Object::new(ObjectClass::Ordinary, Some(object_prototype.clone()));
    let boolean_prototype = Object::new(ObjectClass::Ordinary, Some(object_prototype.clone()));
    let global = Object::new(ObjectClass::Ordinary, Some(object_prototype.clone()));

    let builder = Builder {
        function_prototype: function_prototype.clone(),
    };

    install_object(&builder, &global, &object_prototype);
    install_array(&builder, &global, &array_prototype);
    let error_prototypes = install_errors(&builder, &global, &object_prototype);

    builder.method(&string_prototype, "toString", |realm, this, _args| {
        Ok(Value::String(realm.to_string(&this)?))
    });
    builder.method(&number_prototype, "toString", |realm, this, _args| {
        Ok(Value::String(realm.to_string(&this)?))
    });

    Intrinsics {
        object_prototype,
        function_prototype,
        array_prototype,
        string_prototype,
        number_prototype,
        boolean_prototype,
        error_prototypes,
        global,
    }
}

fn install_object(builder: &Builder, global: &Object, object_prototype: &Object) {
    let object = builder.constructor("Object", object_prototype, |realm, args| {
        Ok(match arg(&args, 0) {
            value @ Value::Object(_) => value,
            _ => Value::Object(realm.new_object()),
        })
    });

    builder.method(&object, "keys", |realm, _this, args| {
        let target = arg(&args, 0);
        let Value::Object(object) = &target else {
            if target.is_nullish() {
                return Err(realm.type_error("Cannot convert undefined or null to object"));
            }
            return Ok(Value::Object(realm.new_array(Vec::new())));
        };
        let keys = object
            .own_keys()
            .into_iter()
            .filter(|key| {
                object
                    .get_own_property(key)
                    .is_some_and(|property| property.is_enumerable())
            })
            .map(|key| Value::String(key.as_str().to_string()))
            .collect();
        Ok(Value::Object(realm.new_array(keys)))
    });

    builder.method(object_prototype, "hasOwnProperty", |realm, this, args| {
        let key = realm.to_property_key(&arg(&args, 0))?;
        let descriptor = realm.get_own_property_descriptor(&this, &key)?;
        Ok(Value::Bool(!descriptor.is_undefined()))
    });

    builder.method(object_prototype, "toString", |_realm, this, _args| {
        let tag = match &this {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Object(object) if object.is_array() => "Array",
            Value::Object(object) if object.is_error() => "Error",
            Value::Object(object) if object.is_callable() => "Function",
            _ => "Object",
        };
        Ok(Value::String(format!("[object {}]", tag)))
    });

    global.define_own_property(PropertyKey::from("Object"), PropertyDescriptor::hidden(object));
}

fn install_array(builder: &Builder, global: &Object, array_prototype: &Object) {
    let array = builder.constructor("Array", array_prototype, |realm, args| {
        if let [Value::Number(length)] = args.as_slice() {
            let length = *length;
            if length < 0.0 || length.fract() != 0.0 || length > f64::from(u32::MAX) {
                return Err(realm.range_error("Invalid array length"));
            }
            let array = realm.new_array(Vec::new());
            array.define_own_property(
                PropertyKey::from("length"),
                PropertyDescriptor {
                    value: Some(Value::Number(length)),
                    ..PropertyDescriptor::default()
                },
            );
            return Ok(Value::Object(array));
        }
        Ok(Value::Object(realm.new_array(args)))
    });

    builder.method(&array, "of", |realm, _this, args| {
        Ok(Value::Object(realm.new_array(args)))
    });
    builder.method(&array, "isArray", |_realm, _this, args| {
        Ok(Value::Bool(
            arg(&args, 0).as_object().is_some_and(|object| object.is_array()),
        ))
    });

    builder.method(array_prototype, "push", |realm, this, args| {
        let mut length = realm.length_of(&this)?;
        if u32::try_from(args.len()).ok().and_then(|n| length.checked_add(n)).is_none() {
            return Err(realm.type_error(format!(
                "Pushing {} elements on an array-like of length {} is disallowed",
                args.len(),
                length
            )));
        }
        for item in args {
            realm.set(&this, &PropertyKey::from(length), item)?;
            length += 1;
        }
        let length = Value::Number(f64::from(length));
        realm.set(&this, &PropertyKey::from("length"), length.clone())?;
        Ok(length)
    });

    builder.method(array_prototype, "pop", |realm, this, _args| {
        let length = realm.length_of(&this)?;
        if length == 0 {
            realm.set(&this, &PropertyKey::from("length"), Value::Number(0.0))?;
            return Ok(Value::Undefined);
        }
        let last = PropertyKey::from(length - 1);
        let value = realm.get(&this, &last)?;
        realm.delete_property(&this, &last)?;
        realm.set(&this, &PropertyKey::from("length"), Value::Number(f64::from(length - 1)))?;
        Ok(value)
    });

    builder.method(array_prototype, "join", |realm, this, args| {
        let separator = match arg(&args, 0) {
            Value::Undefined => ",".to_string(),
            other => realm.to_string(&other)?,
        };
        let Value::Object(object) = &this else {
            return Err(realm.type_error("Array.prototype.join called on non-object"));
        };
        Ok(Value::String(realm.join(object, &separator)?))
    });

    builder.method(array_prototype, "slice", |realm, this, args| {
        let length = realm.length_of(&this)?;
        let start = relative_index(realm, &arg(&args, 0), length, 0)?;
        let end = relative_index(realm, &arg(&args, 1), length, length)?;
        if end.saturating_sub(start) > MAX_WALK_LENGTH {
            return Err(realm.range_error("Invalid array length"));
        }
        let items = (start..end.max(start))
            .map(|index| realm.get(&this, &PropertyKey::from(index)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Object(realm.new_array(items)))
    });

    builder.method(array_prototype, "indexOf", |realm, this, args| {
        let search = arg(&args, 0);
        let length = realm.length_of(&this)?;
        let indices: Box<dyn Iterator<Item = u32>> = match this.as_object() {
            // Sparse walk: only own indices can match
            Some(object) if length > MAX_WALK_LENGTH => Box::new(
                object
                    .own_keys()
                    .into_iter()
                    .filter_map(|key| key.as_index())
                    .filter(move |index| *index < length),
            ),
            _ => Box::new(0..length),
        };
        for index in indices {
            let key = PropertyKey::from(index);
            if realm.has(&this, &key).unwrap_or(false) && realm.get(&this, &key)?.strict_equals(&search) {
                return Ok(Value::Number(f64::from(index)));
            }
        }
        Ok(Value::Number(-1.0))
    });

    global.define_own_property(PropertyKey::from("Array"), PropertyDescriptor::hidden(array));
}

fn install_errors(
    builder: &Builder,
    global: &Object,
    object_prototype: &Object,
) -> Vec<(String, Object)> {
    let mut prototypes: Vec<(String, Object)> = Vec::new();
    for kind in ErrorKind::BUILTIN {
        let name = kind.name().to_string();
        let parent = prototypes
            .first()
            .map(|(_, prototype)| prototype.clone())
            .unwrap_or_else(|| object_prototype.clone());
        let prototype = Object::new(ObjectClass::Ordinary, Some(parent));
        prototype.define_own_property(PropertyKey::from("name"), PropertyDescriptor::hidden(name.as_str()));
        prototype.define_own_property(PropertyKey::from("message"), PropertyDescriptor::hidden(""));

        let error_name = name.clone();
        let constructor = builder.constructor(&name, &prototype, move |realm, args| {
            let message = match arg(&args, 0) {
                Value::Undefined => None,
                other => Some(realm.to_string(&other)?),
            };
            Ok(Value::Object(error_object(realm, &error_name, message)))
        });
        global.define_own_property(PropertyKey::from(name.as_str()), PropertyDescriptor::hidden(constructor));
        prototypes.push((name, prototype));
    }

    if let Some((_, error_prototype)) = prototypes.first() {
        builder.method(error_prototype, "toString", |realm, this, _args| {
            if !matches!(this, Value::Object(_)) {
                return Err(realm.type_error("Error.prototype.toString called on non-object"));
            }
            Ok(Value::String(realm.to_string(&this)?))
        });
    }
    prototypes
}

#[cfg(test)]
#[path = "builtins_tests.rs"]
mod tests;
