//! Logging utilities for modhook
//!
//! This module is only available with the `logging` feature.
//!
//! For library users: modhook emits tracing events - install your own subscriber.
//! For application developers: use these convenience functions.

use std::sync::Once;

pub use modhook_config::LogLevel;
use modhook_config::LoggingConfig;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Silent => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
    }
}

/// Build the filter for `config`.
///
/// Explicit `filter` directives are appended to the level and replace
/// `RUST_LOG`; without them `RUST_LOG` is honoured on top of the level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    match &config.filter {
        Some(directives) => EnvFilter::builder()
            .parse_lossy(format!("{},{}", config.level.as_filter(), directives)),
        None => EnvFilter::builder()
            .with_default_directive(level_filter(config.level).into())
            .from_env_lossy(),
    }
}

fn install(filter: EnvFilter) {
    INIT.call_once(|| {
        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer().compact().with_target(false).without_time(), // Let consumers control timestamp format
            )
            .try_init();
        if installed.is_err() {
            tracing::debug!("a global subscriber is already installed");
        }
    });
}

/// Initialize modhook logging with specified level
///
/// # Thread Safety
///
/// This function installs a global subscriber and should only be called once
/// per process. It is safe to call from multiple threads - only the first
/// call will take effect.
///
/// # Example
///
/// ```rust,no_run
/// use modhook::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Info);
/// ```
pub fn init_logging(level: LogLevel) {
    init_logging_with(&LoggingConfig {
        level,
        filter: None,
    });
}

/// Initialize logging from the `[logging]` section of a [`ModhookConfig`](modhook_config::ModhookConfig).
pub fn init_logging_with(config: &LoggingConfig) {
    install(env_filter(config));
}

/// Initialize logging from RUST_LOG environment variable
///
/// Falls back to Info level if RUST_LOG is not set or invalid.
pub fn init_logging_from_env() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy()
    });
    install(filter);
}
