//! Find-then-patch flows against a registry that initializes in stages.

mod helpers;

use std::io::Write;
use std::sync::Arc;

use helpers::*;
use modhook::{
    Error, Function, GetModuleOptions, LookupOptions, ModuleRegistry, Object, Runtime, Unpatch,
    Value, filters,
};
use parking_lot::Mutex;

/// Module 1 is a logger reached through its imported path, module 2 a store
/// that depends on it.
fn staged_runtime() -> Runtime {
    let registry = ModuleRegistry::new();
    registry
        .define(id(1), [], |ctx| {
            ctx.finished_importing("modules/debug/Logger.tsx")?;
            let logger = Object::new().with(
                "log",
                Function::named("log", |args| {
                    Ok(Value::from(format!("log: {}", args.len())))
                }),
            );
            Ok(Value::from(logger))
        })
        .unwrap();
    registry
        .define(id(2), [id(1)], |ctx| {
            ctx.require_dependency(0)?;
            let store = Object::new()
                .with("getState", Function::new(|_| Ok(Value::from("idle"))))
                .with("subscribe", Function::new(|_| Ok(Value::Undefined)));
            Ok(Value::from(store))
        })
        .unwrap();
    Runtime::with_registry(registry)
}

#[test]
fn test_patch_module_when_it_initializes() {
    let runtime = staged_runtime();
    let handles: Arc<Mutex<Vec<Unpatch>>> = Arc::new(Mutex::new(Vec::new()));

    let patcher = runtime.patcher().clone();
    let sink = handles.clone();
    let subscription = runtime.finder().get_module(
        &filters::with_props(["getState", "subscribe"]),
        move |exports, _| {
            let Some(store) = exports.as_object() else {
                return;
            };
            let handle = patcher
                .instead(store, "getState", |_, _| Ok(Value::from("patched")))
                .unwrap();
            sink.lock().push(handle);
        },
        GetModuleOptions::default(),
    );
    assert!(subscription.is_active());

    let store = runtime.registry().require(id(2)).unwrap();
    assert!(!subscription.is_active());
    assert_eq!(handles.lock().len(), 1);

    let store = store.as_object().unwrap().clone();
    assert_eq!(store.call_method("getState", &[]).unwrap(), Value::from("patched"));

    assert_eq!(runtime.unpatch_all(), 1);
    assert_eq!(store.call_method("getState", &[]).unwrap(), Value::from("idle"));
    assert!(!handles.lock()[0].unpatch());
}

#[test]
fn test_imported_path_then_lookup_hits_cache() {
    let runtime = staged_runtime();
    let (seen, callback) = recorder();

    let _pending = runtime
        .finder()
        .get_module_by_imported_path("modules/debug/Logger.tsx", callback);
    assert!(seen.lock().is_empty());

    // Requiring the store initializes the logger as a dependency
    runtime.registry().require(id(2)).unwrap();
    assert_eq!(*seen.lock(), vec![id(1)]);

    let logger = filters::with_props(["log"]);
    let found = runtime.finder().lookup(&logger, LookupOptions::default()).unwrap();
    assert_eq!(found.id, id(1));

    let (exports, owner) = runtime
        .finder()
        .lookup_by_imported_path("modules/debug/Logger.tsx")
        .unwrap();
    assert_eq!(owner, id(1));
    assert!(exports.unwrap().has_property("log"));
}

#[test]
fn test_hooks_compose_on_found_module() {
    let runtime = staged_runtime();
    runtime.registry().require(id(1)).unwrap();

    let logger = runtime
        .finder()
        .lookup(&filters::with_props(["log"]), LookupOptions::default())
        .and_then(|found| found.exports)
        .and_then(|exports| exports.as_object().cloned())
        .unwrap();
    let patcher = runtime.patcher();

    let _prefix = patcher
        .before(&logger, "log", |args| {
            args.insert(0, Value::from("prefix"));
            Ok(())
        })
        .unwrap();
    let _suffix = patcher
        .after(&logger, "log", |_, result| {
            Ok(result.as_str().map(|s| Value::from(format!("{s}!"))))
        })
        .unwrap();

    let result = logger.call_method("log", &[Value::from("a")]).unwrap();
    assert_eq!(result, Value::from("log: 2!"));
    assert_eq!(patcher.hook_count(&logger, "log"), 2);
    assert_eq!(patcher.patched_slots(), 1);
}

#[test]
fn test_runtime_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[finder]\ncache = false").unwrap();

    let runtime = Runtime::load(ModuleRegistry::new(), Some(file.path())).unwrap();
    assert!(!runtime.finder().settings().cache_enabled);

    let missing = Runtime::load(ModuleRegistry::new(), Some(file.path().with_extension("json").as_path()));
    assert!(matches!(missing, Err(Error::Config(_))));
}
