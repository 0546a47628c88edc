//! Shared callables.

use std::fmt;
use std::sync::Arc;

use crate::{CallResult, Object, Value};

/// Signature of every callable stored in a [`Function`].
pub type NativeFn = dyn Fn(&[Value]) -> CallResult + Send + Sync;

/// A reference-counted callable with an optional declared name and its own
/// property table (static members).
///
/// The declared name mirrors a named function or class declaration and is
/// what [`Value::declared_name`] reports for functions.
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionInner>,
}

struct FunctionInner {
    name: Option<Arc<str>>,
    properties: Object,
    call: Box<NativeFn>,
}

impl Function {
    /// An anonymous function.
    pub fn new<F>(call: F) -> Self
    where
        F: Fn(&[Value]) -> CallResult + Send + Sync + 'static,
    {
        Self::build(None, call)
    }

    /// A function with a declared name.
    pub fn named<F>(name: impl Into<Arc<str>>, call: F) -> Self
    where
        F: Fn(&[Value]) -> CallResult + Send + Sync + 'static,
    {
        Self::build(Some(name.into()), call)
    }

    fn build<F>(name: Option<Arc<str>>, call: F) -> Self
    where
        F: Fn(&[Value]) -> CallResult + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(FunctionInner {
                name,
                properties: Object::new(),
                call: Box::new(call),
            }),
        }
    }

    /// A different callable under this function's name, sharing its static
    /// members table.
    pub fn with_call<F>(&self, call: F) -> Self
    where
        F: Fn(&[Value]) -> CallResult + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(FunctionInner {
                name: self.inner.name.clone(),
                properties: self.inner.properties.clone(),
                call: Box::new(call),
            }),
        }
    }

    pub fn call(&self, args: &[Value]) -> CallResult {
        (self.inner.call)(args)
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Static members attached to the function.
    pub fn properties(&self) -> &Object {
        &self.inner.properties
    }

    /// Builder-style insert of a static member.
    pub fn with(self, key: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.inner.properties.set(key, value);
        self
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("statics", &self.inner.properties.keys())
            .finish()
    }
}
