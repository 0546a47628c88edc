use std::sync::Arc;

use modhook_value::{CallError, Value};

use crate::error::{RegistryError, Result};
use crate::{ModuleId, ModuleRegistry};

/// Signature of a module factory.
pub type ModuleFactory = dyn Fn(&FactoryContext<'_>) -> std::result::Result<Value, CallError> + Send + Sync;

/// What a running factory can see: its own id, its dependency list, and the
/// registry to require from.
pub struct FactoryContext<'a> {
    pub(crate) registry: &'a ModuleRegistry,
    pub(crate) id: ModuleId,
    pub(crate) dependencies: Arc<[ModuleId]>,
}

impl FactoryContext<'_> {
    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn dependencies(&self) -> &[ModuleId] {
        &self.dependencies
    }

    pub fn require(&self, id: ModuleId) -> Result<Value> {
        self.registry.require(id)
    }

    /// Require the dependency at `index` of this module's dependency list.
    pub fn require_dependency(&self, index: usize) -> Result<Value> {
        let id = self
            .dependencies
            .get(index)
            .copied()
            .ok_or(RegistryError::MissingDependency {
                id: self.id,
                index,
            })?;
        self.registry.require(id)
    }

    /// Report that this module's source file finished importing under `path`.
    pub fn finished_importing(&self, path: &str) -> Result<()> {
        self.registry.finished_importing(path)
    }
}
