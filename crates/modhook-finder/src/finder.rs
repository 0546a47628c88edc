use std::sync::Arc;

use modhook_registry::{ModuleId, ModuleRegistry};
use modhook_value::Value;
use serde::{Deserialize, Serialize};

use crate::cache::{LookupCache, MatchFlag};
use crate::filters::Filter;

/// Finder behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderSettings {
    /// Log every lookup result (`debug` on success, `warn` on failure).
    pub debug_lookups: bool,
    /// Master switch for the lookup cache. When off, `LookupOptions::cached`
    /// is ignored and nothing is read from or written to the cache.
    pub cache_enabled: bool,
}

impl Default for FinderSettings {
    fn default() -> Self {
        Self {
            debug_lookups: false,
            cache_enabled: true,
        }
    }
}

/// Lookup, cache and wait engine over one [`ModuleRegistry`].
///
/// Cloning is cheap; clones share the registry and the cache.
#[derive(Debug, Clone)]
pub struct Finder {
    pub(crate) registry: ModuleRegistry,
    pub(crate) cache: Arc<LookupCache>,
    pub(crate) settings: FinderSettings,
}

impl Finder {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self::with_settings(registry, FinderSettings::default())
    }

    pub fn with_settings(registry: ModuleRegistry, settings: FinderSettings) -> Self {
        Self {
            registry,
            cache: Arc::new(LookupCache::new()),
            settings,
        }
    }

    /// Share an existing cache, e.g. one restored from a snapshot.
    pub fn with_cache(mut self, cache: Arc<LookupCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<LookupCache> {
        &self.cache
    }

    pub fn settings(&self) -> FinderSettings {
        self.settings
    }

    pub(crate) fn caching(&self, requested: bool) -> bool {
        requested && self.settings.cache_enabled
    }
}

/// Evaluate `filter` on one module the way every lookup path does.
///
/// Modules with inspectable exports are tested on the exports and then on
/// `exports.default`. Modules without them are only tested by filters that
/// do not need exports.
pub(crate) fn run_filter(
    filter: &Filter,
    registry: &ModuleRegistry,
    id: ModuleId,
    exports: Option<&Value>,
) -> Option<MatchFlag> {
    match exports {
        Some(exports) if exports.is_inspectable() => {
            if filter.matches(registry, id, Some(exports)) {
                return Some(MatchFlag::Exports);
            }
            let default = exports.get_property("default")?;
            (default.is_inspectable() && filter.matches(registry, id, Some(&default)))
                .then_some(MatchFlag::DefaultExport)
        }
        _ if filter.requires_exports() => None,
        _ => filter
            .matches(registry, id, None)
            .then_some(MatchFlag::Uninitialized),
    }
}

/// The value handed to callers for a match.
pub(crate) fn resolve_exports(flag: MatchFlag, exports: Value, return_namespace: bool) -> Value {
    match flag {
        MatchFlag::DefaultExport if !return_namespace => {
            exports.get_property("default").unwrap_or_default()
        }
        _ => exports,
    }
}
