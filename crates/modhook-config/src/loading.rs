use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};

use crate::ModhookConfig;
use crate::error::{ConfigError, Result};

/// Prefix of environment overrides (`MODHOOK_LOGGING__LEVEL=debug`).
pub const ENV_PREFIX: &str = "MODHOOK_";

/// Files picked up from the working directory, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &["modhook.toml", "modhook.json"];

impl ModhookConfig {
    /// Load configuration from the current directory.
    /// Priority: environment variables > config file > defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_from_dir(Path::new("."), config_path)
    }

    /// Load configuration, resolving files relative to `dir`.
    pub fn load_from_dir(dir: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(dir, config_path)?.extract()?;
        config.validate()?;
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }

    /// The layered provider stack, for callers that want to merge their own
    /// overrides on top before extracting.
    pub fn figment(dir: &Path, config_path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) => {
                let path = dir.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path));
                }
                Some(path)
            }
            None => Self::discover(dir),
        };

        if let Some(path) = config_file {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// First of [`CONFIG_FILE_NAMES`] present in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }
}
