//! Synchronous lookups.
//!
//! A lookup first replays whatever the cache knows for the filter key, then
//! scans the requested subset of the registry. Results stream out of a lazy
//! [`Lookups`] iterator, so [`Finder::lookup`] stops scanning at the first
//! match while [`Finder::lookup_many`] can walk everything.

use std::sync::Arc;

use modhook_registry::ModuleId;
use modhook_value::Value;
use rustc_hash::FxHashSet as HashSet;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntry, MatchFlag};
use crate::filters::Filter;
use crate::finder::{resolve_exports, run_filter, Finder};

/// Which modules a lookup considers and what it may do to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupOptions {
    /// Consult and populate the cache.
    pub cached: bool,
    /// Scan every module; overrides `initialized` and `uninitialized`.
    pub all: bool,
    pub initialized: bool,
    pub uninitialized: bool,
    /// Run the factory of cached ids that are still uninitialized so the
    /// replay can hand out their exports. Scans never initialize.
    pub initialize: bool,
    /// For matches on `exports.default`, return the whole exports value.
    pub return_namespace: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            cached: true,
            all: false,
            initialized: true,
            uninitialized: false,
            initialize: true,
            return_namespace: false,
        }
    }
}

impl LookupOptions {
    /// Every module, initialized or not.
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// Only modules that have not initialized yet.
    pub fn uninitialized_only() -> Self {
        Self {
            initialized: false,
            uninitialized: true,
            ..Self::default()
        }
    }

    pub fn uncached(self) -> Self {
        Self {
            cached: false,
            ..self
        }
    }

    /// Skip cached ids that have not initialized instead of requiring them.
    pub fn without_initialize(self) -> Self {
        Self {
            initialize: false,
            ..self
        }
    }
}

/// One lookup result.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupMatch {
    pub id: ModuleId,
    /// `None` for a module matched before it initialized, or whose factory
    /// failed when a replay tried to initialize it.
    pub exports: Option<Value>,
    pub flag: MatchFlag,
}

enum Phase {
    Replay(std::vec::IntoIter<(ModuleId, MatchFlag)>),
    Scan(std::vec::IntoIter<ModuleId>),
    Done,
}

/// Lazy lookup results. Each [`Finder::lookup_many`] call starts afresh.
pub struct Lookups {
    finder: Finder,
    filter: Filter,
    key: Arc<str>,
    options: LookupOptions,
    cached: bool,
    phase: Phase,
    replayed: HashSet<ModuleId>,
    yielded: usize,
    /// An uninitialized candidate could not be tested against the filter.
    deferred: bool,
}

impl Lookups {
    fn new(finder: &Finder, filter: &Filter, options: LookupOptions) -> Self {
        let cached = finder.caching(options.cached);
        let key = filter.shared_key();

        let phase = if cached {
            match finder.cache.get(&key) {
                Some(CacheEntry::NotFound) => Phase::Done,
                Some(CacheEntry::Found(ids)) => {
                    Phase::Replay(ids.into_iter().collect::<Vec<_>>().into_iter())
                }
                None => Phase::Scan(Self::candidates(finder, &options)),
            }
        } else {
            Phase::Scan(Self::candidates(finder, &options))
        };

        Self {
            finder: finder.clone(),
            filter: filter.clone(),
            key,
            options,
            cached,
            phase,
            replayed: HashSet::default(),
            yielded: 0,
            deferred: false,
        }
    }

    fn candidates(finder: &Finder, options: &LookupOptions) -> std::vec::IntoIter<ModuleId> {
        let registry = &finder.registry;
        let ids = if options.all {
            registry.module_ids()
        } else {
            let mut ids = Vec::new();
            if options.initialized {
                ids.extend(registry.initialized_ids());
            }
            if options.uninitialized {
                ids.extend(registry.uninitialized_ids());
            }
            ids
        };
        ids.into_iter()
    }

    /// Replay one cached id. `None` when it cannot be served right now.
    fn replay(&mut self, id: ModuleId, flag: MatchFlag) -> Option<LookupMatch> {
        let registry = &self.finder.registry;
        let exports = if registry.is_initialized(id) {
            registry.exports(id)
        } else if self.options.initialize {
            self.force_initialize(id)
        } else {
            return None;
        };

        self.replayed.insert(id);
        Some(self.make_match(id, exports, flag))
    }

    fn scan(&mut self, id: ModuleId) -> Option<LookupMatch> {
        if self.replayed.contains(&id) {
            return None;
        }

        let registry = &self.finder.registry;
        let exports = registry.exports(id);
        if exports.is_none() && self.filter.requires_exports() && !registry.is_initialized(id) {
            self.deferred = true;
            return None;
        }
        let flag = run_filter(&self.filter, registry, id, exports.as_ref())?;

        if self.cached {
            self.finder.cache.record_match(&self.key, id, flag);
        }
        Some(self.make_match(id, exports, flag))
    }

    fn force_initialize(&self, id: ModuleId) -> Option<Value> {
        match self.finder.registry.require(id) {
            Ok(exports) => Some(exports),
            Err(error) => {
                tracing::debug!(module = %id, %error, "lookup could not initialize module");
                None
            }
        }
    }

    fn make_match(&mut self, id: ModuleId, exports: Option<Value>, flag: MatchFlag) -> LookupMatch {
        self.yielded += 1;
        let exports = exports.map(|e| resolve_exports(flag, e, self.options.return_namespace));
        if self.finder.settings.debug_lookups {
            tracing::debug!(
                key = %self.key,
                module = %id,
                ?flag,
                replayed = self.replayed.contains(&id),
                "lookup matched"
            );
        }
        LookupMatch { id, exports, flag }
    }

    fn finish(&mut self) {
        if self.yielded == 0 {
            // A miss is only final when every module was actually tested.
            if self.cached && self.options.all && !self.deferred {
                self.finder.cache.record_not_found(&self.key);
            }
            if self.finder.settings.debug_lookups {
                tracing::warn!(key = %self.key, "lookup found no module");
            }
        }
        self.phase = Phase::Done;
    }
}

impl Iterator for Lookups {
    type Item = LookupMatch;

    fn next(&mut self) -> Option<LookupMatch> {
        loop {
            match &mut self.phase {
                Phase::Replay(ids) => match ids.next() {
                    Some((id, flag)) => {
                        if let Some(found) = self.replay(id, flag) {
                            return Some(found);
                        }
                    }
                    None => {
                        self.phase = Phase::Scan(Self::candidates(&self.finder, &self.options));
                    }
                },
                Phase::Scan(ids) => match ids.next() {
                    Some(id) => {
                        if let Some(found) = self.scan(id) {
                            return Some(found);
                        }
                    }
                    None => self.finish(),
                },
                Phase::Done => return None,
            }
        }
    }
}

impl Finder {
    /// First module matching `filter`.
    pub fn lookup(&self, filter: &Filter, options: LookupOptions) -> Option<LookupMatch> {
        self.lookup_many(filter, options).next()
    }

    /// Every module matching `filter`, lazily.
    ///
    /// Cached ids come first, in the order they were cached, followed by
    /// newly scanned matches in registry order.
    pub fn lookup_many(&self, filter: &Filter, options: LookupOptions) -> Lookups {
        Lookups::new(self, filter, options)
    }

    /// Exports and id of the module that reported `path` as its imported
    /// path. Exports are `None` until that module has initialized.
    pub fn lookup_by_imported_path(&self, path: &str) -> Option<(Option<Value>, ModuleId)> {
        let id = self.registry.module_id_by_imported_path(path)?;
        Some((self.registry.exports(id), id))
    }
}
