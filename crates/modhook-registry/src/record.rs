//! Per-module bookkeeping.

use std::sync::Arc;

use modhook_value::{CallError, Value};
use serde::{Deserialize, Serialize};

use crate::ModuleId;

/// Lifecycle state of a module. Transitions are monotonic:
/// `Unrequired -> Requiring -> Initialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleState {
    /// Defined, factory never run.
    Unrequired,
    /// Factory running, or factory failed (the record keeps the failure).
    Requiring,
    /// Exports available.
    Initialized,
}

/// Snapshot of everything the registry knows about one module.
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    pub(crate) id: ModuleId,
    pub(crate) dependencies: Arc<[ModuleId]>,
    pub(crate) state: ModuleState,
    pub(crate) exports: Option<Value>,
    pub(crate) bad_exports: bool,
    pub(crate) imported_path: Option<Arc<str>>,
    pub(crate) failure: Option<CallError>,
}

impl ModuleRecord {
    pub(crate) fn new(id: ModuleId, dependencies: Arc<[ModuleId]>) -> Self {
        Self {
            id,
            dependencies,
            state: ModuleState::Unrequired,
            exports: None,
            bad_exports: false,
            imported_path: None,
            failure: None,
        }
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn dependencies(&self) -> &Arc<[ModuleId]> {
        &self.dependencies
    }

    pub fn state(&self) -> ModuleState {
        self.state
    }

    /// Exports, present only once the module is initialized.
    pub fn exports(&self) -> Option<&Value> {
        self.exports.as_ref()
    }

    /// True when the module initialized to something that cannot answer
    /// property queries (a scalar, `null`, `undefined`).
    pub fn has_bad_exports(&self) -> bool {
        self.bad_exports
    }

    pub fn imported_path(&self) -> Option<&str> {
        self.imported_path.as_deref()
    }

    pub fn failure(&self) -> Option<&CallError> {
        self.failure.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.state == ModuleState::Initialized
    }
}
