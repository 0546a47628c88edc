//! Error types for registry operations.

use modhook_value::CallError;
use thiserror::Error;

use crate::ModuleId;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown module {0}")]
    UnknownModule(ModuleId),

    #[error("module {0} is already defined")]
    DuplicateModule(ModuleId),

    #[error("module {id} has no dependency at index {index}")]
    MissingDependency { id: ModuleId, index: usize },

    #[error("module {0} was required while it is still initializing")]
    CircularRequire(ModuleId),

    /// The factory failed. The failure is retained and replayed on every
    /// later require of the same module.
    #[error("factory of module {id} failed: {source}")]
    FactoryFailed {
        id: ModuleId,
        #[source]
        source: CallError,
    },

    #[error("finished importing `{0}` while no module is initializing")]
    NotInitializing(String),
}

/// Lets factories use `?` on nested requires.
impl From<RegistryError> for CallError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::FactoryFailed { source, .. } => source,
            other => CallError::Thrown(other.to_string()),
        }
    }
}
