//! Composable module predicates.
//!
//! A [`Filter`] tests `(registry, id, exports?)` and carries two pieces of
//! metadata the lookup engine relies on:
//!
//! - a **key**: two filters with the same key must match the same modules,
//!   because the key indexes the lookup cache;
//! - a **requires-exports** flag: filters that inspect exports cannot say
//!   anything about a module that has none yet, so scans skip such modules
//!   instead of asking.
//!
//! Primitive filters are produced by [`FilterGenerator`]s, which pair a match
//! function with a key function so that the same arguments always yield the
//! same key.

mod combinators;
mod primitives;

use std::fmt;
use std::sync::Arc;

use modhook_registry::{ModuleId, ModuleRegistry};
use modhook_value::Value;

pub use combinators::{and, or, prefer_exports};
pub use primitives::{
    with_dependencies, with_imported_path, with_name, with_props, with_single_prop, without_props,
};

/// Signature of a filter's predicate.
pub type Predicate = dyn Fn(&ModuleRegistry, ModuleId, Option<&Value>) -> bool + Send + Sync;

/// An immutable, cheaply clonable module predicate.
#[derive(Clone)]
pub struct Filter {
    key: Arc<str>,
    requires_exports: bool,
    predicate: Arc<Predicate>,
}

impl Filter {
    pub fn new<F>(key: impl Into<Arc<str>>, requires_exports: bool, predicate: F) -> Self
    where
        F: Fn(&ModuleRegistry, ModuleId, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            requires_exports,
            predicate: Arc::new(predicate),
        }
    }

    /// Cache key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn shared_key(&self) -> Arc<str> {
        self.key.clone()
    }

    pub fn requires_exports(&self) -> bool {
        self.requires_exports
    }

    /// Evaluate the predicate directly.
    ///
    /// No default-export fallback and no requires-exports guard are applied
    /// here; the lookup engine adds both.
    pub fn matches(&self, registry: &ModuleRegistry, id: ModuleId, exports: Option<&Value>) -> bool {
        (self.predicate)(registry, id, exports)
    }

    /// Same predicate under a different cache key.
    ///
    /// Useful for hand-written filters whose closure captures state the
    /// default key would not describe.
    pub fn key_as(&self, key: impl Into<Arc<str>>) -> Self {
        Self {
            key: key.into(),
            requires_exports: self.requires_exports,
            predicate: self.predicate.clone(),
        }
    }

    /// Both filters match.
    pub fn and(self, other: Filter) -> Self {
        and(self, other)
    }

    /// Either filter matches.
    pub fn or(self, other: Filter) -> Self {
        or(self, other)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("key", &self.key)
            .field("requires_exports", &self.requires_exports)
            .finish_non_exhaustive()
    }
}

type MatchFn<A> = dyn Fn(&A, &ModuleRegistry, ModuleId, Option<&Value>) -> bool + Send + Sync;
type KeyFn<A> = dyn Fn(&A) -> String + Send + Sync;
type FlagFn<A> = dyn Fn(&A) -> bool + Send + Sync;

/// A family of filters parameterised by `A`.
///
/// ```rust
/// use modhook_finder::filters::FilterGenerator;
///
/// let by_prop_count = FilterGenerator::new(
///     |count: &usize, _, _, exports| {
///         exports.and_then(|e| e.own_key_count()) == Some(*count)
///     },
///     |count| format!("propCount({count})"),
///     true,
/// );
///
/// let filter = by_prop_count.generate(3);
/// assert_eq!(filter.key(), "propCount(3)");
/// assert_eq!(by_prop_count.key_for(&3), "propCount(3)");
/// ```
pub struct FilterGenerator<A> {
    matcher: Arc<MatchFn<A>>,
    key_for: Arc<KeyFn<A>>,
    requires_exports: Arc<FlagFn<A>>,
}

impl<A> Clone for FilterGenerator<A> {
    fn clone(&self) -> Self {
        Self {
            matcher: self.matcher.clone(),
            key_for: self.key_for.clone(),
            requires_exports: self.requires_exports.clone(),
        }
    }
}

impl<A: Send + Sync + 'static> FilterGenerator<A> {
    pub fn new<M, K>(matcher: M, key_for: K, requires_exports: bool) -> Self
    where
        M: Fn(&A, &ModuleRegistry, ModuleId, Option<&Value>) -> bool + Send + Sync + 'static,
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        Self::with_flag_fn(matcher, key_for, move |_| requires_exports)
    }

    /// Like [`new`](Self::new), with the requires-exports flag derived from
    /// the arguments (combinators inherit it from their children).
    pub fn with_flag_fn<M, K, R>(matcher: M, key_for: K, requires_exports: R) -> Self
    where
        M: Fn(&A, &ModuleRegistry, ModuleId, Option<&Value>) -> bool + Send + Sync + 'static,
        K: Fn(&A) -> String + Send + Sync + 'static,
        R: Fn(&A) -> bool + Send + Sync + 'static,
    {
        Self {
            matcher: Arc::new(matcher),
            key_for: Arc::new(key_for),
            requires_exports: Arc::new(requires_exports),
        }
    }

    pub fn generate(&self, args: A) -> Filter {
        let key = (self.key_for)(&args);
        let requires_exports = (self.requires_exports)(&args);
        let matcher = self.matcher.clone();
        Filter::new(key, requires_exports, move |registry, id, exports| {
            matcher(&args, registry, id, exports)
        })
    }

    pub fn key_for(&self, args: &A) -> String {
        (self.key_for)(args)
    }
}

/// Join filter keys or property names for use inside a key.
pub(crate) fn join_keys<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(part.as_ref());
    }
    out
}
