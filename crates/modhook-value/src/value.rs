//! The dynamically-typed value.

use std::sync::Arc;

use crate::{Function, Object};

/// A dynamically-typed value as produced by a module factory.
///
/// Only [`Value::Object`] and [`Value::Function`] are *inspectable*: they are
/// the only variants that can answer property queries. Everything else is
/// what the registry calls "bad exports" when it is a module's whole export
/// value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Object(Object),
    Function(Function),
}

impl Value {
    /// True for objects and functions.
    pub fn is_inspectable(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Function(_))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Key-existence query.
    ///
    /// Functions report their static members, plus `name` when they carry a
    /// declared name. Non-inspectable values have no properties.
    pub fn has_property(&self, key: &str) -> bool {
        match self {
            Value::Object(object) => object.has(key),
            Value::Function(function) => {
                function.properties().has(key) || (key == "name" && function.name().is_some())
            }
            _ => false,
        }
    }

    pub fn get_property(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(object) => object.get(key),
            Value::Function(function) => function.properties().get(key).or_else(|| {
                (key == "name")
                    .then(|| function.name().map(Value::from))
                    .flatten()
            }),
            _ => None,
        }
    }

    /// Number of own properties of an object. `None` for anything else.
    pub fn own_key_count(&self) -> Option<usize> {
        match self {
            Value::Object(object) => Some(object.len()),
            _ => None,
        }
    }

    /// The declared name: a function's name, or an object's `name` string
    /// property.
    pub fn declared_name(&self) -> Option<Arc<str>> {
        match self {
            Value::Function(function) => function.name().map(Arc::from),
            Value::Object(object) => match object.get("name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Scalars compare by value, objects and functions by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<Arc<str>> for Value {
    fn from(value: Arc<str>) -> Self {
        Value::String(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, Into::into)
    }
}
