//! Waiting for modules that have not initialized yet.

use std::sync::Arc;

use modhook_registry::{ModuleId, Subscription};
use modhook_value::Value;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::filters::Filter;
use crate::finder::{resolve_exports, run_filter, Finder};
use crate::lookup::LookupOptions;

/// Options for [`Finder::wait_for_modules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Record matches in the lookup cache.
    pub cached: bool,
    pub return_namespace: bool,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            cached: true,
            return_namespace: false,
        }
    }
}

impl From<LookupOptions> for WaitOptions {
    fn from(options: LookupOptions) -> Self {
        Self {
            cached: options.cached,
            return_namespace: options.return_namespace,
        }
    }
}

impl Finder {
    /// Call `callback(exports, id)` for every module that initializes from
    /// now on and matches `filter`.
    ///
    /// Modules that are already initialized are not reported; combine with a
    /// lookup (see [`get_module`](Self::get_module)) for that. The
    /// subscription stays active until unsubscribed.
    pub fn wait_for_modules<F>(&self, filter: &Filter, callback: F, options: WaitOptions) -> Subscription
    where
        F: Fn(Value, ModuleId) + Send + Sync + 'static,
    {
        let registry = self.registry.downgrade();
        let cache = self.cache.clone();
        let cached = self.caching(options.cached);
        let filter = filter.clone();
        let key = filter.shared_key();

        self.registry.on_initialized_any(move |id, exports| {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            let Some(flag) = run_filter(&filter, &registry, id, Some(exports)) else {
                return;
            };
            if cached {
                cache.record_match(&key, id, flag);
            }
            tracing::trace!(key = %key, module = %id, "waited module initialized");
            callback(resolve_exports(flag, exports.clone(), options.return_namespace), id);
        })
    }

    /// Call `callback(exports, id)` once the module whose imported path is
    /// `path` has initialized. Fires at most once.
    ///
    /// Unsubscribing before it fires cancels both the wait for the path and
    /// the wait for the module's initialization.
    pub fn wait_for_module_by_imported_path<F>(&self, path: &str, callback: F) -> Subscription
    where
        F: Fn(Value, ModuleId) + Send + Sync + 'static,
    {
        let registry = self.registry.downgrade();
        let path: Arc<str> = Arc::from(path);
        let callback = Arc::new(callback);

        let path_subscription: Arc<OnceCell<Subscription>> = Arc::new(OnceCell::new());
        let init_subscription: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let path_slot = path_subscription.clone();
        let init_slot = init_subscription.clone();
        let subscription = self.registry.on_finished_importing(move |id, imported| {
            if imported != &*path {
                return;
            }
            if let Some(subscription) = path_slot.get() {
                subscription.unsubscribe();
            }
            let Some(registry) = registry.upgrade() else {
                return;
            };
            let callback = callback.clone();
            let waiting = registry.on_initialized(id, move |id, exports| callback(exports.clone(), id));
            *init_slot.lock() = Some(waiting);
        });
        let _ = path_subscription.set(subscription.clone());

        Subscription::new(move || {
            subscription.unsubscribe();
            if let Some(waiting) = init_subscription.lock().take() {
                waiting.unsubscribe();
            }
        })
    }
}
