//! Top-level error type.

use modhook_config::ConfigError;
use modhook_patcher::PatchError;
use modhook_registry::RegistryError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Any error surfaced by the modhook crates.
///
/// Lookups and waits never fail: "not found" is `None` or a pending
/// subscription.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
