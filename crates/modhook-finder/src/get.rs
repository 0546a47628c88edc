//! Lookup-then-wait.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use modhook_registry::{ModuleId, Subscription};
use modhook_value::Value;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rustc_hash::FxHashSet as HashSet;

use crate::filters::Filter;
use crate::finder::Finder;
use crate::lookup::LookupOptions;

/// Options for [`Finder::get_module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetModuleOptions {
    pub lookup: LookupOptions,
    /// How many modules to deliver in total. `usize::MAX` for no limit.
    pub max: usize,
}

impl Default for GetModuleOptions {
    fn default() -> Self {
        Self {
            lookup: LookupOptions::default(),
            max: 1,
        }
    }
}

impl GetModuleOptions {
    pub fn max(max: usize) -> Self {
        Self {
            max,
            ..Self::default()
        }
    }
}

impl Finder {
    /// Deliver up to `options.max` modules matching `filter`: first those a
    /// lookup can find right now, then ones that initialize later.
    ///
    /// When the lookup alone satisfies `max`, nothing is left subscribed and
    /// the returned [`Subscription`] is inactive. Otherwise the subscription
    /// removes itself once the remaining count reaches zero.
    pub fn get_module<F>(&self, filter: &Filter, callback: F, options: GetModuleOptions) -> Subscription
    where
        F: Fn(Value, ModuleId) + Send + Sync + 'static,
    {
        if options.max == 0 {
            return Subscription::noop();
        }

        let mut delivered = HashSet::default();
        if options.max == 1 {
            if let Some(found) = self.lookup(filter, options.lookup) {
                callback(found.exports.unwrap_or_default(), found.id);
                return Subscription::noop();
            }
        } else {
            for found in self.lookup_many(filter, options.lookup).take(options.max) {
                delivered.insert(found.id);
                callback(found.exports.unwrap_or_default(), found.id);
            }
            if delivered.len() >= options.max {
                return Subscription::noop();
            }
        }

        let remaining = Arc::new(AtomicUsize::new(options.max - delivered.len()));
        let delivered = Arc::new(Mutex::new(delivered));
        let slot: Arc<OnceCell<Subscription>> = Arc::new(OnceCell::new());

        let self_slot = slot.clone();
        let subscription = self.wait_for_modules(
            filter,
            move |exports, id| {
                if !delivered.lock().insert(id) {
                    return;
                }
                let taken = remaining.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
                let Ok(before) = taken else {
                    return;
                };
                if before == 1 {
                    if let Some(subscription) = self_slot.get() {
                        subscription.unsubscribe();
                    }
                }
                callback(exports, id);
            },
            options.lookup.into(),
        );
        let _ = slot.set(subscription.clone());
        subscription
    }

    /// [`get_module`](Self::get_module) without a limit.
    pub fn get_modules<F>(&self, filter: &Filter, callback: F, lookup: LookupOptions) -> Subscription
    where
        F: Fn(Value, ModuleId) + Send + Sync + 'static,
    {
        self.get_module(filter, callback, GetModuleOptions { lookup, max: usize::MAX })
    }

    /// Deliver the module whose imported path is `path`, now if it has
    /// initialized, otherwise once it does.
    pub fn get_module_by_imported_path<F>(&self, path: &str, callback: F) -> Subscription
    where
        F: Fn(Value, ModuleId) + Send + Sync + 'static,
    {
        match self.lookup_by_imported_path(path) {
            Some((Some(exports), id)) => {
                callback(exports, id);
                Subscription::noop()
            }
            Some((None, id)) => self
                .registry
                .on_initialized(id, move |id, exports| callback(exports.clone(), id)),
            None => self.wait_for_module_by_imported_path(path, callback),
        }
    }
}
