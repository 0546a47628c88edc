//! # modhook-config
//!
//! Settings for the finder and for log output, loaded in layers:
//!
//! ```text
//! defaults < modhook.toml / modhook.json < MODHOOK_* environment
//! ```
//!
//! Nested keys use a double underscore in the environment, so
//! `MODHOOK_FINDER__DEBUG_LOOKUPS=true` sets `finder.debug_lookups`.
//!
//! ```toml
//! [finder]
//! debug_lookups = true
//! cache = true
//!
//! [logging]
//! level = "debug"
//! filter = "modhook_patcher=trace"
//! ```

mod defaults;
mod error;
mod level;
mod loading;
mod validation;

pub use defaults::*;
pub use error::{ConfigError, Result};
pub use level::LogLevel;
pub use loading::{CONFIG_FILE_NAMES, ENV_PREFIX};
pub use validation::validate_filter;

use serde::{Deserialize, Serialize};

/// Top-level modhook configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModhookConfig {
    #[serde(default)]
    pub finder: FinderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Lookup behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Log every lookup result. Successful lookups are logged at debug level.
    #[serde(default = "default_debug_lookups")]
    pub debug_lookups: bool,

    /// Master switch for the lookup cache.
    #[serde(default = "default_cache")]
    pub cache: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            debug_lookups: default_debug_lookups(),
            cache: default_cache(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Extra `EnvFilter` directives appended after the level,
    /// e.g. `modhook_finder=debug,modhook_patcher=trace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            filter: None,
        }
    }
}
