//! Shared property tables.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::{CallError, CallResult, Value};

/// A reference-counted, insertion-ordered property table.
///
/// Cloning an `Object` yields another handle to the same table; writes
/// through one handle are visible through every other. Locks are only held
/// for the duration of a single property access, never across calls into
/// stored functions.
#[derive(Clone, Default)]
pub struct Object {
    inner: Arc<RwLock<IndexMap<Arc<str>, Value>>>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for assembling exports.
    pub fn with(self, key: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Key-existence query. Presence only: a property holding `undefined`
    /// still counts.
    pub fn has(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().get(key).cloned()
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn set(&self, key: impl Into<Arc<str>>, value: impl Into<Value>) -> Option<Value> {
        self.inner.write().insert(key.into(), value.into())
    }

    /// Remove `key`, preserving the order of the remaining properties.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().shift_remove(key)
    }

    pub fn keys(&self) -> Vec<Arc<str>> {
        self.inner.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Stable address of the underlying table, usable as an identity key
    /// while this handle (or any clone) is alive.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    /// Look up `key` and invoke it.
    ///
    /// The function is cloned out of the table before the call, so the callee
    /// is free to mutate this object (including replacing the slot it was
    /// called through).
    pub fn call_method(&self, key: &str, args: &[Value]) -> CallResult {
        match self.get(key) {
            Some(Value::Function(function)) => function.call(args),
            _ => Err(CallError::NotCallable(key.to_string())),
        }
    }
}

impl fmt::Debug for Object {
    // Property values may reference this object again; only keys are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.keys())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Object
where
    K: Into<Arc<str>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let table = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Function;

    #[test]
    fn test_clone_shares_table() {
        let a = Object::new();
        let b = a.clone();
        a.set("x", 1);

        assert!(b.has("x"));
        assert!(a.ptr_eq(&b));
        assert_eq!(a.addr(), b.addr());
        assert!(!a.ptr_eq(&Object::new()));
    }

    #[test]
    fn test_presence_not_value() {
        let object = Object::new().with("maybe", Value::Undefined);
        assert!(object.has("maybe"));
        assert!(!object.has("other"));
    }

    #[test]
    fn test_remove_keeps_order() {
        let object: Object = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        object.remove("b");

        let keys: Vec<String> = object.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_call_method_can_replace_own_slot() {
        let object = Object::new();
        let handle = object.clone();
        object.set(
            "once",
            Function::new(move |_| {
                handle.set("once", Value::Null);
                Ok(Value::from(true))
            }),
        );

        assert_eq!(object.call_method("once", &[]).unwrap(), Value::from(true));
        assert_eq!(object.get("once"), Some(Value::Null));
        assert!(matches!(
            object.call_method("once", &[]),
            Err(CallError::NotCallable(_))
        ));
    }
}
