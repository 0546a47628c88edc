//! The module table.

use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use modhook_value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::error::{RegistryError, Result};
use crate::factory::{FactoryContext, ModuleFactory};
use crate::record::{ModuleRecord, ModuleState};
use crate::subscription::{Subscribers, Subscription};
use crate::ModuleId;

type FirstRequiredCallback = dyn Fn(ModuleId) + Send + Sync;
type FinishedImportingCallback = dyn Fn(ModuleId, &str) + Send + Sync;
type InitializedCallback = dyn Fn(ModuleId, &Value) + Send + Sync;

/// A lazily-initialising module table with lifecycle instrumentation.
///
/// The registry plays both roles the finder needs: it is the host loader
/// (modules are [`define`](Self::define)d with a dependency list and a
/// factory, and run on first [`require`](Self::require)), and it is the
/// observer over that loader (enumeration, per-module state, and the
/// first-required / finished-importing / initialized event streams).
///
/// Cloning is cheap and yields a handle to the same table. Internal locks are
/// released before factories and subscribers run, so both may re-enter the
/// registry.
#[derive(Clone)]
pub struct ModuleRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    state: RwLock<RegistryState>,
    first_required: Subscribers<FirstRequiredCallback>,
    finished_importing: Subscribers<FinishedImportingCallback>,
    initialized: Subscribers<InitializedCallback>,
}

#[derive(Default)]
struct RegistryState {
    /// Definition order is registry iteration order.
    records: IndexMap<ModuleId, ModuleRecord>,
    factories: HashMap<ModuleId, Arc<ModuleFactory>>,
    /// Initialization order, bad exports excluded.
    initialized: Vec<ModuleId>,
    imported_paths: HashMap<Arc<str>, ModuleId>,
    /// Stack of modules whose factory is currently running.
    initializing: Vec<ModuleId>,
}

/// Keeps `id` on the initializing stack for as long as its factory runs,
/// including when the factory unwinds.
struct InitializingGuard<'a> {
    registry: &'a ModuleRegistry,
}

impl<'a> InitializingGuard<'a> {
    fn push(registry: &'a ModuleRegistry, id: ModuleId) -> Self {
        registry.inner.state.write().initializing.push(id);
        Self { registry }
    }
}

impl Drop for InitializingGuard<'_> {
    fn drop(&mut self) {
        self.registry.inner.state.write().initializing.pop();
    }
}

/// Non-owning handle to a [`ModuleRegistry`], for subscribers that live
/// inside the registry they observe.
#[derive(Clone)]
pub struct WeakModuleRegistry {
    inner: Weak<RegistryInner>,
}

impl WeakModuleRegistry {
    pub fn upgrade(&self) -> Option<ModuleRegistry> {
        self.inner.upgrade().map(|inner| ModuleRegistry { inner })
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                state: RwLock::new(RegistryState::default()),
                first_required: Subscribers::new(),
                finished_importing: Subscribers::new(),
                initialized: Subscribers::new(),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakModuleRegistry {
        WeakModuleRegistry {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ---------------------------------------------------------------------
    // Host side
    // ---------------------------------------------------------------------

    /// Define a module. Its dependency list is fixed from here on.
    pub fn define<I, F>(&self, id: ModuleId, dependencies: I, factory: F) -> Result<()>
    where
        I: IntoIterator<Item = ModuleId>,
        F: Fn(&FactoryContext<'_>) -> std::result::Result<Value, modhook_value::CallError>
            + Send
            + Sync
            + 'static,
    {
        let dependencies: Arc<[ModuleId]> = dependencies.into_iter().collect();
        let mut state = self.inner.state.write();
        if state.records.contains_key(&id) {
            return Err(RegistryError::DuplicateModule(id));
        }

        state
            .records
            .insert(id, ModuleRecord::new(id, dependencies));
        state.factories.insert(id, Arc::new(factory));
        Ok(())
    }

    /// Define a module whose factory returns a fixed value.
    pub fn define_value<I>(&self, id: ModuleId, dependencies: I, exports: impl Into<Value>) -> Result<()>
    where
        I: IntoIterator<Item = ModuleId>,
    {
        let exports = exports.into();
        self.define(id, dependencies, move |_| Ok(exports.clone()))
    }

    /// Run a module's factory if needed and return its exports.
    ///
    /// Fires first-required before the factory runs and initialized after it
    /// returns. A failed factory is never retried.
    pub fn require(&self, id: ModuleId) -> Result<Value> {
        let (factory, dependencies) = {
            let mut state = self.inner.state.write();
            let record = state
                .records
                .get_mut(&id)
                .ok_or(RegistryError::UnknownModule(id))?;

            match record.state {
                ModuleState::Initialized => {
                    return Ok(record.exports.clone().unwrap_or_default());
                }
                ModuleState::Requiring => {
                    return Err(match &record.failure {
                        Some(source) => RegistryError::FactoryFailed {
                            id,
                            source: source.clone(),
                        },
                        None => RegistryError::CircularRequire(id),
                    });
                }
                ModuleState::Unrequired => {}
            }

            record.state = ModuleState::Requiring;
            let dependencies = record.dependencies.clone();
            let factory = state
                .factories
                .get(&id)
                .cloned()
                .ok_or(RegistryError::UnknownModule(id))?;
            (factory, dependencies)
        };

        tracing::trace!(module = %id, "module first required");
        self.inner
            .first_required
            .dispatch(id, "first-required", |cb| cb(id));

        let context = FactoryContext {
            registry: self,
            id,
            dependencies,
        };
        let result = {
            let _initializing = InitializingGuard::push(self, id);
            factory(&context)
        };

        let exports = {
            let mut state = self.inner.state.write();
            let record = state
                .records
                .get_mut(&id)
                .ok_or(RegistryError::UnknownModule(id))?;

            match result {
                Ok(exports) => {
                    let bad = !exports.is_inspectable();
                    record.state = ModuleState::Initialized;
                    record.bad_exports = bad;
                    record.exports = Some(exports.clone());
                    if bad {
                        tracing::debug!(module = %id, "module initialized with bad exports");
                    } else {
                        state.initialized.push(id);
                    }
                    exports
                }
                Err(source) => {
                    tracing::debug!(module = %id, error = %source, "module factory failed");
                    record.failure = Some(source.clone());
                    return Err(RegistryError::FactoryFailed { id, source });
                }
            }
        };

        tracing::trace!(module = %id, "module initialized");
        self.inner
            .initialized
            .dispatch(id, "initialized", |cb| cb(id, &exports));

        Ok(exports)
    }

    /// Record that the module currently initializing resolved its source
    /// path. Paths are unique; a path that is already owned is ignored.
    pub fn finished_importing(&self, path: &str) -> Result<()> {
        let (id, path) = {
            let mut state = self.inner.state.write();
            let id = *state
                .initializing
                .last()
                .ok_or_else(|| RegistryError::NotInitializing(path.to_string()))?;

            if state.imported_paths.contains_key(path) {
                tracing::debug!(module = %id, path, "imported path already owned, ignoring");
                return Ok(());
            }

            let path: Arc<str> = Arc::from(path);
            state.imported_paths.insert(path.clone(), id);
            if let Some(record) = state.records.get_mut(&id) {
                if record.imported_path.is_none() {
                    record.imported_path = Some(path.clone());
                }
            }
            (id, path)
        };

        self.inner
            .finished_importing
            .dispatch(id, "finished-importing", |cb| cb(id, &*path));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Observer side
    // ---------------------------------------------------------------------

    /// Every defined module id, in definition order.
    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.inner.state.read().records.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.inner.state.read().records.contains_key(&id)
    }

    pub fn record(&self, id: ModuleId) -> Option<ModuleRecord> {
        self.inner.state.read().records.get(&id).cloned()
    }

    /// Dependency list, `None` for an unknown module.
    pub fn dependencies(&self, id: ModuleId) -> Option<Arc<[ModuleId]>> {
        self.inner
            .state
            .read()
            .records
            .get(&id)
            .map(|record| record.dependencies.clone())
    }

    pub fn state(&self, id: ModuleId) -> Option<ModuleState> {
        self.inner.state.read().records.get(&id).map(|r| r.state)
    }

    pub fn is_initialized(&self, id: ModuleId) -> bool {
        self.state(id) == Some(ModuleState::Initialized)
    }

    /// Exports of an initialized module.
    pub fn exports(&self, id: ModuleId) -> Option<Value> {
        self.inner
            .state
            .read()
            .records
            .get(&id)
            .and_then(|record| record.exports.clone())
    }

    pub fn has_bad_exports(&self, id: ModuleId) -> bool {
        self.inner
            .state
            .read()
            .records
            .get(&id)
            .is_some_and(|record| record.bad_exports)
    }

    /// Initialized modules with inspectable exports, in initialization order.
    pub fn initialized_ids(&self) -> Vec<ModuleId> {
        self.inner.state.read().initialized.clone()
    }

    /// Modules without exports yet, in definition order.
    pub fn uninitialized_ids(&self) -> Vec<ModuleId> {
        self.inner
            .state
            .read()
            .records
            .values()
            .filter(|record| record.state != ModuleState::Initialized)
            .map(|record| record.id)
            .collect()
    }

    pub fn module_id_by_imported_path(&self, path: &str) -> Option<ModuleId> {
        self.inner.state.read().imported_paths.get(path).copied()
    }

    pub fn imported_path(&self, id: ModuleId) -> Option<Arc<str>> {
        self.inner
            .state
            .read()
            .records
            .get(&id)
            .and_then(|record| record.imported_path.clone())
    }

    /// The module whose factory is running right now, if any.
    pub fn initializing_id(&self) -> Option<ModuleId> {
        self.inner.state.read().initializing.last().copied()
    }

    // ---------------------------------------------------------------------
    // Lifecycle subscriptions
    // ---------------------------------------------------------------------

    /// One-shot: fires when `id` is first required.
    pub fn on_first_required<F>(&self, id: ModuleId, callback: F) -> Subscription
    where
        F: Fn(ModuleId) + Send + Sync + 'static,
    {
        self.inner.first_required.subscribe_id(id, Arc::new(callback))
    }

    pub fn on_first_required_any<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ModuleId) + Send + Sync + 'static,
    {
        self.inner.first_required.subscribe_any(Arc::new(callback))
    }

    pub fn on_finished_importing<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ModuleId, &str) + Send + Sync + 'static,
    {
        self.inner.finished_importing.subscribe_any(Arc::new(callback))
    }

    /// One-shot: fires when `id` initializes. Never fires for a module that
    /// is already initialized.
    pub fn on_initialized<F>(&self, id: ModuleId, callback: F) -> Subscription
    where
        F: Fn(ModuleId, &Value) + Send + Sync + 'static,
    {
        self.inner.initialized.subscribe_id(id, Arc::new(callback))
    }

    pub fn on_initialized_any<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ModuleId, &Value) + Send + Sync + 'static,
    {
        self.inner.initialized.subscribe_any(Arc::new(callback))
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("ModuleRegistry")
            .field("modules", &state.records.len())
            .field("initialized", &state.initialized.len())
            .field("imported_paths", &state.imported_paths.len())
            .finish()
    }
}
