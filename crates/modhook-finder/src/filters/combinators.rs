//! Filter combinators.

use once_cell::sync::Lazy;

use super::{Filter, FilterGenerator};

type Pair = (Filter, Filter);

static AND: Lazy<FilterGenerator<Pair>> = Lazy::new(|| {
    FilterGenerator::with_flag_fn(
        |(left, right): &Pair, registry, id, exports| {
            left.matches(registry, id, exports) && right.matches(registry, id, exports)
        },
        |(left, right)| format!("and({},{})", left.key(), right.key()),
        |(left, right)| left.requires_exports() || right.requires_exports(),
    )
});

static OR: Lazy<FilterGenerator<Pair>> = Lazy::new(|| {
    FilterGenerator::with_flag_fn(
        |(left, right): &Pair, registry, id, exports| {
            left.matches(registry, id, exports) || right.matches(registry, id, exports)
        },
        |(left, right)| format!("or({},{})", left.key(), right.key()),
        |(left, right)| left.requires_exports() || right.requires_exports(),
    )
});

/// `(with_exports, fallback, strict)`.
type Preference = (Filter, Filter, bool);

static PREFER_EXPORTS: Lazy<FilterGenerator<Preference>> = Lazy::new(|| {
    FilterGenerator::new(
        |(with_exports, fallback, strict): &Preference, registry, id, exports| match exports {
            Some(exports) if exports.is_inspectable() && registry.is_initialized(id) => {
                with_exports.matches(registry, id, Some(exports))
                    && (!strict || fallback.matches(registry, id, None))
            }
            _ => fallback.matches(registry, id, None),
        },
        |(with_exports, fallback, strict)| {
            let name = if *strict { "preferExportsStrict" } else { "preferExports" };
            format!("{name}({},{})", with_exports.key(), fallback.key())
        },
        false,
    )
});

/// Both filters match.
pub fn and(left: Filter, right: Filter) -> Filter {
    AND.generate((left, right))
}

/// Either filter matches.
pub fn or(left: Filter, right: Filter) -> Filter {
    OR.generate((left, right))
}

/// Evaluate `with_exports` once a module has inspectable exports, and the
/// exports-less `fallback` before that (or when its exports are bad).
///
/// With `strict`, an initialized module must satisfy both filters, which
/// keeps the match set of the two phases consistent.
pub fn prefer_exports(with_exports: Filter, fallback: Filter, strict: bool) -> Filter {
    if cfg!(debug_assertions) && fallback.requires_exports() {
        tracing::warn!(
            fallback = %fallback.key(),
            "prefer_exports fallback requires exports; it can never match an uninitialized module"
        );
    }
    PREFER_EXPORTS.generate((with_exports, fallback, strict))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::DependencyPattern;
    use crate::filters::{with_dependencies, with_props};
    use modhook_registry::{ModuleId, ModuleRegistry};
    use modhook_value::{Object, Value};

    fn object(keys: &[&str]) -> Value {
        keys.iter()
            .fold(Object::new(), |object, key| object.with(*key, true))
            .into()
    }

    #[test]
    fn test_and_or_over_props() {
        let registry = ModuleRegistry::new();
        let id = ModuleId::new(1);
        let both = with_props(["a"]).and(with_props(["b"]));
        let either = with_props(["a"]).or(with_props(["b"]));

        assert_eq!(both.key(), "and(props(a),props(b))");
        assert_eq!(either.key(), "or(props(a),props(b))");

        assert!(both.matches(&registry, id, Some(&object(&["a", "b"]))));
        assert!(!both.matches(&registry, id, Some(&object(&["a"]))));
        assert!(either.matches(&registry, id, Some(&object(&["a"]))));
        assert!(either.matches(&registry, id, Some(&object(&["b"]))));
        assert!(!either.matches(&registry, id, Some(&object(&["c"]))));
    }

    #[test]
    fn test_combined_requires_exports_is_or_of_children() {
        let exportless = with_dependencies(DependencyPattern::new([]));
        assert!(and(exportless.clone(), with_props(["a"])).requires_exports());
        assert!(or(exportless.clone(), with_props(["a"])).requires_exports());
        assert!(!and(exportless.clone(), exportless).requires_exports());
    }

    #[test]
    fn test_prefer_exports_switches_on_initialization() {
        let registry = ModuleRegistry::new();
        let id = ModuleId::new(1);
        registry
            .define_value(id, [ModuleId::new(4)], object(&["render"]))
            .unwrap();

        let filter = prefer_exports(
            with_props(["render"]),
            with_dependencies(DependencyPattern::new([4u32.into()])),
            false,
        );
        assert!(!filter.requires_exports());
        assert_eq!(filter.key(), "preferExports(props(render),deps([4]))");

        // Before initialization only the fallback is consulted.
        assert!(filter.matches(&registry, id, None));

        let exports = registry.require(id).unwrap();
        assert!(filter.matches(&registry, id, Some(&exports)));
        assert!(!filter.matches(&registry, id, Some(&object(&["other"]))));
    }

    #[test]
    fn test_prefer_exports_strict_checks_both() {
        let registry = ModuleRegistry::new();
        let id = ModuleId::new(1);
        registry.define_value(id, [ModuleId::new(5)], object(&["render"])).unwrap();
        let exports = registry.require(id).unwrap();

        let lenient = prefer_exports(
            with_props(["render"]),
            with_dependencies(DependencyPattern::new([4u32.into()])),
            false,
        );
        let strict = prefer_exports(
            with_props(["render"]),
            with_dependencies(DependencyPattern::new([4u32.into()])),
            true,
        );

        assert!(strict.key().starts_with("preferExportsStrict("));
        assert!(lenient.matches(&registry, id, Some(&exports)));
        assert!(!strict.matches(&registry, id, Some(&exports)));
    }

    #[test]
    fn test_prefer_exports_bad_exports_use_fallback() {
        let registry = ModuleRegistry::new();
        let id = ModuleId::new(1);
        registry.define_value(id, [ModuleId::new(4)], 7).unwrap();
        let exports = registry.require(id).unwrap();

        let filter = prefer_exports(
            with_props(["render"]),
            with_dependencies(DependencyPattern::new([4u32.into()])),
            false,
        );
        assert!(filter.matches(&registry, id, Some(&exports)));
    }
}
