use std::path::Path;

use modhook_config::{FinderConfig, ModhookConfig};
use modhook_finder::{Finder, FinderSettings};
use modhook_patcher::Patcher;
use modhook_registry::ModuleRegistry;

use crate::error::Result;

/// One registry together with the finder and patcher working on it.
///
/// Everything that would otherwise be process-wide (the lookup cache, the
/// set of patched slots) lives here, so independent runtimes never observe
/// each other. Cloning is cheap and shares all state.
#[derive(Debug, Clone)]
pub struct Runtime {
    registry: ModuleRegistry,
    finder: Finder,
    patcher: Patcher,
}

impl Runtime {
    /// A runtime over a fresh, empty registry with default settings.
    pub fn new() -> Self {
        Self::with_registry(ModuleRegistry::new())
    }

    pub fn with_registry(registry: ModuleRegistry) -> Self {
        Self::with_config(registry, &ModhookConfig::default())
    }

    pub fn with_config(registry: ModuleRegistry, config: &ModhookConfig) -> Self {
        let finder = Finder::with_settings(registry.clone(), finder_settings(&config.finder));
        tracing::debug!(settings = ?finder.settings(), "created runtime");
        Self {
            registry,
            finder,
            patcher: Patcher::new(),
        }
    }

    /// Load [`ModhookConfig`] from the working directory (or `config_path`)
    /// and build a runtime over `registry`.
    pub fn load(registry: ModuleRegistry, config_path: Option<&Path>) -> Result<Self> {
        let config = ModhookConfig::load(config_path)?;
        Ok(Self::with_config(registry, &config))
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn finder(&self) -> &Finder {
        &self.finder
    }

    pub fn patcher(&self) -> &Patcher {
        &self.patcher
    }

    /// Remove every hook installed through this runtime's patcher.
    pub fn unpatch_all(&self) -> usize {
        self.patcher.unpatch_all()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

fn finder_settings(config: &FinderConfig) -> FinderSettings {
    FinderSettings {
        debug_lookups: config.debug_lookups,
        cache_enabled: config.cache,
    }
}
