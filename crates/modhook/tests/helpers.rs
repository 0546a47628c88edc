//! Shared test utilities for modhook integration tests

#![allow(dead_code)]

use std::sync::Arc;

use modhook::{Function, ModuleId, ModuleRegistry, Object, Runtime, Value};
use parking_lot::Mutex;

pub fn id(raw: u32) -> ModuleId {
    ModuleId::new(raw)
}

/// An object exports value with the given keys set to `true`.
pub fn exports(keys: &[&str]) -> Value {
    keys.iter()
        .fold(Object::new(), |object, key| object.with(*key, true))
        .into()
}

/// A runtime whose registry holds `(id, deps, keys)` modules, none required.
pub fn runtime_with(modules: &[(u32, &[u32], &[&str])]) -> Runtime {
    let registry = ModuleRegistry::new();
    for (raw, deps, keys) in modules {
        registry
            .define_value(id(*raw), deps.iter().copied().map(ModuleId::new), exports(keys))
            .unwrap();
    }
    Runtime::with_registry(registry)
}

pub fn require_all(runtime: &Runtime) {
    for module in runtime.registry().module_ids() {
        runtime.registry().require(module).unwrap();
    }
}

/// Ordered record of named events.
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// An object with a `run` method that logs "original" and echoes its first
/// argument.
pub fn target(log: &Log) -> (Object, Function) {
    let log = log.clone();
    let run = Function::named("run", move |args| {
        log.lock().push("original".to_string());
        Ok(args.first().cloned().unwrap_or_default())
    });
    (Object::new().with("run", run.clone()), run)
}

/// Records `(id)` for every delivered module.
pub fn recorder() -> (Arc<Mutex<Vec<ModuleId>>>, impl Fn(Value, ModuleId) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |_: Value, id: ModuleId| sink.lock().push(id))
}
