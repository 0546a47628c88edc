//! Behaviour every embedding relies on, exercised through the facade.

mod helpers;

use helpers::*;
use modhook::deps::{any, relative};
use modhook::{
    CacheEntry, DependencyPattern, Filter, GetModuleOptions, LookupOptions, ModuleId, Value, WaitOptions,
    filters,
};

#[test]
fn test_full_scan_yields_matching_subset_in_registry_order() {
    let runtime = runtime_with(&[
        (3, &[], &["a"]),
        (1, &[], &["b"]),
        (8, &[], &["a", "b"]),
        (5, &[], &["a"]),
    ]);
    require_all(&runtime);

    let found: Vec<ModuleId> = runtime
        .finder()
        .lookup_many(&filters::with_props(["a"]), LookupOptions::all())
        .map(|found| found.id)
        .collect();
    assert_eq!(found, vec![id(3), id(8), id(5)]);
}

#[test]
fn test_partial_lookup_may_serve_stale_first_match() {
    let runtime = runtime_with(&[(1, &[], &["other"]), (2, &[], &["store"])]);
    require_all(&runtime);
    let store = filters::with_props(["store"]);

    let first = runtime.finder().lookup(&store, LookupOptions::default()).unwrap();
    assert_eq!(first.id, id(2));

    // A module defined and initialized later would also match
    runtime.registry().define_value(id(0), [], exports(&["store"])).unwrap();
    runtime.registry().require(id(0)).unwrap();

    let again = runtime.finder().lookup(&store, LookupOptions::default()).unwrap();
    assert_eq!(again.id, id(2));
}

#[test]
fn test_full_scan_not_found_is_never_a_false_negative() {
    let runtime = runtime_with(&[(1, &[], &["a"]), (2, &[], &["render"])]);
    runtime.registry().require(id(1)).unwrap();
    let render = filters::with_props(["render"]);

    // Module 2 has not initialized, so it cannot be tested yet.
    assert!(runtime.finder().lookup(&render, LookupOptions::all()).is_none());
    assert!(runtime.finder().cache().get(render.key()).is_none());

    runtime.registry().require(id(2)).unwrap();
    assert_eq!(
        runtime.finder().lookup(&render, LookupOptions::all()).map(|found| found.id),
        Some(id(2))
    );
    assert_eq!(
        runtime.finder().lookup(&render, LookupOptions::default()).map(|found| found.id),
        Some(id(2))
    );

    // Once every module is testable, a miss is remembered.
    let missing = filters::with_props(["zzz"]);
    assert!(runtime.finder().lookup(&missing, LookupOptions::all()).is_none());
    assert!(matches!(
        runtime.finder().cache().get(missing.key()),
        Some(CacheEntry::NotFound)
    ));
}

#[test]
fn test_dependency_shape_with_wildcard_and_loose() {
    let runtime = runtime_with(&[
        (10, &[4, 7, 2], &[]),
        (11, &[4, 7, 3], &[]),
        (12, &[4, 7], &[]),
        (13, &[4], &[]),
        (14, &[4, 9], &[]),
        (15, &[4, 9, 1], &[]),
        (16, &[5], &[]),
    ]);
    let finder = runtime.finder();

    let exact = filters::with_dependencies(DependencyPattern::new([4u32.into(), any(), 2u32.into()]));
    let found: Vec<_> = finder
        .lookup_many(&exact, LookupOptions::all())
        .map(|found| found.id)
        .collect();
    assert_eq!(found, vec![id(10)]);

    let loose = filters::with_dependencies(DependencyPattern::new([4u32.into()]).loose());
    let found: Vec<_> = finder
        .lookup_many(&loose, LookupOptions::all())
        .map(|found| found.id)
        .collect();
    assert_eq!(found, vec![id(10), id(11), id(12), id(13), id(14), id(15)]);
}

#[test]
fn test_relative_dependency_resolves_against_module() {
    let runtime = runtime_with(&[(10, &[11, 2], &[]), (20, &[11, 2], &[])]);

    let pattern = filters::with_dependencies(DependencyPattern::new([relative(1), 2u32.into()]));
    let found = runtime
        .finder()
        .lookup(&pattern, LookupOptions::all())
        .unwrap();
    assert_eq!(found.id, id(10));
    assert!(found.exports.is_none());
}

#[test]
fn test_and_or_combinators() {
    let runtime = runtime_with(&[
        (1, &[], &["a"]),
        (2, &[], &["b"]),
        (3, &[], &["a", "b"]),
        (4, &[], &["c"]),
    ]);
    require_all(&runtime);
    let finder = runtime.finder();
    let ids = |filter: Filter| -> Vec<ModuleId> {
        finder
            .lookup_many(&filter, LookupOptions::all().uncached())
            .map(|found| found.id)
            .collect()
    };

    assert_eq!(
        ids(filters::and(filters::with_props(["a"]), filters::with_props(["b"]))),
        vec![id(3)]
    );
    assert_eq!(
        ids(filters::or(filters::with_props(["a"]), filters::with_props(["b"]))),
        vec![id(1), id(2), id(3)]
    );
}

#[test]
fn test_before_hooks_run_newest_first_and_restore_identity() {
    let runtime = runtime_with(&[]);
    let log = log();
    let (object, original) = target(&log);

    let h1_log = log.clone();
    let h1 = runtime
        .patcher()
        .before(&object, "run", move |_| {
            h1_log.lock().push("h1".to_string());
            Ok(())
        })
        .unwrap();
    let h2_log = log.clone();
    let h2 = runtime
        .patcher()
        .before(&object, "run", move |_| {
            h2_log.lock().push("h2".to_string());
            Ok(())
        })
        .unwrap();

    object.call_method("run", &[]).unwrap();
    assert_eq!(*log.lock(), vec!["h2", "h1", "original"]);

    assert!(h2.unpatch());
    log.lock().clear();
    object.call_method("run", &[]).unwrap();
    assert_eq!(*log.lock(), vec!["h1", "original"]);

    assert!(h1.unpatch());
    let Some(Value::Function(current)) = object.get("run") else {
        panic!("run should still be a function");
    };
    assert!(current.ptr_eq(&original));
}

#[test]
fn test_after_hook_replacement_reaches_caller() {
    let runtime = runtime_with(&[]);
    let (object, _) = target(&log());

    let _double = runtime
        .patcher()
        .after(&object, "run", |_, result| {
            Ok(result.as_number().map(|n| Value::from(n * 2.0)))
        })
        .unwrap();

    let result = object.call_method("run", &[Value::from(21)]).unwrap();
    assert_eq!(result, Value::from(42));
}

#[test]
fn test_get_module_max_two_is_synchronous() {
    let runtime = runtime_with(&[(1, &[], &["x"]), (2, &[], &["x"]), (3, &[], &["x"])]);
    require_all(&runtime);
    let (seen, callback) = recorder();

    let subscription = runtime.finder().get_module(
        &filters::with_props(["x"]),
        callback,
        GetModuleOptions::max(2),
    );

    assert_eq!(*seen.lock(), vec![id(1), id(2)]);
    assert!(!subscription.is_active());
}

#[test]
fn test_unsubscribed_wait_never_fires() {
    let runtime = runtime_with(&[(1, &[], &["late"])]);
    let (seen, callback) = recorder();

    let subscription = runtime.finder().wait_for_modules(
        &filters::with_props(["late"]),
        callback,
        WaitOptions::default(),
    );
    assert!(subscription.unsubscribe());

    runtime.registry().require(id(1)).unwrap();
    assert!(seen.lock().is_empty());
}
