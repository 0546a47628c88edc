//! Primitive filters.

use std::sync::Arc;

use modhook_value::Value;
use once_cell::sync::Lazy;

use super::{join_keys, Filter, FilterGenerator};
use crate::deps::{self, DependencyPattern};

type Props = Vec<Arc<str>>;

static WITH_PROPS: Lazy<FilterGenerator<Props>> = Lazy::new(|| {
    FilterGenerator::new(
        |props: &Props, _, _, exports| {
            exports.is_some_and(|exports| props.iter().all(|prop| exports.has_property(prop)))
        },
        |props| format!("props({})", join_keys(props)),
        true,
    )
});

static WITHOUT_PROPS: Lazy<FilterGenerator<Props>> = Lazy::new(|| {
    FilterGenerator::new(
        |props: &Props, _, _, exports| match exports {
            Some(exports) if exports.is_inspectable() => {
                !props.iter().any(|prop| exports.has_property(prop))
            }
            _ => true,
        },
        |props| format!("withoutProps({})", join_keys(props)),
        true,
    )
});

static WITH_SINGLE_PROP: Lazy<FilterGenerator<Arc<str>>> = Lazy::new(|| {
    FilterGenerator::new(
        |prop: &Arc<str>, _, _, exports| match exports {
            Some(Value::Object(object)) => object.len() == 1 && object.has(prop),
            _ => false,
        },
        |prop| format!("singleProp({prop})"),
        true,
    )
});

static WITH_NAME: Lazy<FilterGenerator<Arc<str>>> = Lazy::new(|| {
    FilterGenerator::new(
        |name: &Arc<str>, _, _, exports| {
            exports
                .and_then(Value::declared_name)
                .is_some_and(|declared| declared == *name)
        },
        |name| format!("name({name})"),
        true,
    )
});

static WITH_DEPENDENCIES: Lazy<FilterGenerator<DependencyPattern>> = Lazy::new(|| {
    FilterGenerator::new(
        |pattern: &DependencyPattern, registry, id, _| {
            registry
                .dependencies(id)
                .is_some_and(|actual| deps::matches(registry, &actual, pattern, id, id))
        },
        |pattern| format!("deps({})", pattern.key()),
        false,
    )
});

static WITH_IMPORTED_PATH: Lazy<FilterGenerator<Arc<str>>> = Lazy::new(|| {
    FilterGenerator::new(
        |path: &Arc<str>, registry, id, _| registry.imported_path(id).is_some_and(|p| p == *path),
        |path| format!("importedPath({path})"),
        false,
    )
});

fn collect_props<I, S>(props: I) -> Props
where
    I: IntoIterator<Item = S>,
    S: Into<Arc<str>>,
{
    props.into_iter().map(Into::into).collect()
}

/// Exports that have every one of `props`.
pub fn with_props<I, S>(props: I) -> Filter
where
    I: IntoIterator<Item = S>,
    S: Into<Arc<str>>,
{
    WITH_PROPS.generate(collect_props(props))
}

/// Exports that have none of `props`. Vacuously true for values that cannot
/// hold properties.
pub fn without_props<I, S>(props: I) -> Filter
where
    I: IntoIterator<Item = S>,
    S: Into<Arc<str>>,
{
    WITHOUT_PROPS.generate(collect_props(props))
}

/// An object whose only own property is `prop`.
pub fn with_single_prop(prop: impl Into<Arc<str>>) -> Filter {
    WITH_SINGLE_PROP.generate(prop.into())
}

/// Exports whose declared name is `name`.
pub fn with_name(name: impl Into<Arc<str>>) -> Filter {
    WITH_NAME.generate(name.into())
}

/// Modules whose dependency list has the shape of `pattern`.
///
/// Needs no exports, so it can find modules that have not run yet.
pub fn with_dependencies(pattern: DependencyPattern) -> Filter {
    if cfg!(debug_assertions) && pattern.has_unset() {
        tracing::warn!(
            pattern = %pattern.key(),
            "dependency pattern contains an unset slot; it will match any module id"
        );
    }
    WITH_DEPENDENCIES.generate(pattern)
}

/// The module that reported `path` as its imported path.
pub fn with_imported_path(path: impl Into<Arc<str>>) -> Filter {
    WITH_IMPORTED_PATH.generate(path.into())
}
