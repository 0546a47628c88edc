//! Per-filter-key memo of lookup results.

use std::sync::Arc;

use indexmap::IndexMap;
use modhook_registry::ModuleId;
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// How a module satisfied a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFlag {
    /// The filter matched the exports value.
    Exports,
    /// The filter matched `exports.default`.
    DefaultExport,
    /// An exports-less filter matched while the module had no inspectable
    /// exports (not initialized yet, or bad exports).
    Uninitialized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheEntry {
    /// Matched ids, in the order they were first recorded.
    Found(IndexMap<ModuleId, MatchFlag>),
    /// A full scan matched nothing.
    NotFound,
}

/// Filter key to lookup result.
///
/// Entries only grow: ids are added as they match, and a later match turns
/// `NotFound` into `Found`. Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: RwLock<HashMap<Arc<str>, CacheEntry>>,
}

/// Serializable copy of a [`LookupCache`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub entries: IndexMap<String, CacheEntry>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().get(key).cloned()
    }

    /// Record that `id` matched. The first flag recorded for an id sticks.
    pub fn record_match(&self, key: &Arc<str>, id: ModuleId, flag: MatchFlag) {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::Found(IndexMap::new()));
        match entry {
            CacheEntry::Found(ids) => {
                ids.entry(id).or_insert(flag);
            }
            CacheEntry::NotFound => {
                tracing::trace!(key = %key, module = %id, "upgrading not-found cache entry");
                *entry = CacheEntry::Found(IndexMap::from_iter([(id, flag)]));
            }
        }
    }

    /// Record that a full scan found nothing. Never overwrites matches.
    pub fn record_not_found(&self, key: &Arc<str>) {
        self.entries
            .write()
            .entry(key.clone())
            .or_insert(CacheEntry::NotFound);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the cache, keys sorted for stable output.
    pub fn snapshot(&self) -> CacheSnapshot {
        let entries = self.entries.read();
        let mut sorted: Vec<_> = entries.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        CacheSnapshot {
            entries: sorted
                .into_iter()
                .map(|(key, entry)| (key.to_string(), entry.clone()))
                .collect(),
        }
    }

    /// Merge a snapshot in, e.g. one persisted by an earlier run.
    ///
    /// Existing entries win over `NotFound`; matched ids are unioned.
    pub fn restore(&self, snapshot: CacheSnapshot) {
        for (key, entry) in snapshot.entries {
            let key: Arc<str> = Arc::from(key);
            match entry {
                CacheEntry::Found(ids) => {
                    for (id, flag) in ids {
                        self.record_match(&key, id, flag);
                    }
                }
                CacheEntry::NotFound => self.record_not_found(&key),
            }
        }
    }
}
