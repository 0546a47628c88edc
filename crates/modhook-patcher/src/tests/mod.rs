//! Hook ordering, removal and restoration.

mod property_tests;

use std::sync::Arc;

use modhook_value::{Function, Object, Value};
use parking_lot::Mutex;

pub(crate) type Log = Arc<Mutex<Vec<String>>>;

pub(crate) fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// An object whose `run` method logs "original" and returns its first
/// argument (or `Undefined`).
pub(crate) fn target(log: &Log) -> (Object, Function) {
    let sink = log.clone();
    let original = Function::named("run", move |args| {
        sink.lock().push("original".into());
        Ok(args.first().cloned().unwrap_or_default())
    });
    (Object::new().with("run", original.clone()), original)
}

pub(crate) fn current(object: &Object) -> Function {
    match object.get("run") {
        Some(Value::Function(function)) => function,
        other => panic!("slot does not hold a function: {other:?}"),
    }
}
