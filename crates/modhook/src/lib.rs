#![cfg_attr(docsrs, feature(doc_cfg))]

//! # modhook
//!
//! Find modules in a live, lazily-initialising module registry by their
//! shape, and splice hooks into the functions they export.
//!
//! This crate ties the workspace together:
//!
//! - [`modhook_registry`] - the module table and its lifecycle events
//! - [`modhook_finder`] - filters, dependency patterns, cached lookups, waits
//! - [`modhook_patcher`] - before / after / instead hooks on method slots
//! - [`modhook_config`] - layered settings
//!
//! ## Quick Start
//!
//! ```rust
//! use modhook::{filters, LookupOptions, ModuleId, Object, Function, Runtime, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = Runtime::new();
//! let registry = runtime.registry();
//!
//! registry.define(ModuleId::new(7), [], |_| {
//!     let store = Object::new()
//!         .with("getState", Function::new(|_| Ok(Value::from("idle"))))
//!         .with("dispatch", Function::new(|_| Ok(Value::Undefined)));
//!     Ok(Value::from(store))
//! })?;
//! registry.require(ModuleId::new(7))?;
//!
//! let store = runtime
//!     .finder()
//!     .lookup(&filters::with_props(["getState", "dispatch"]), LookupOptions::default())
//!     .and_then(|found| found.exports)
//!     .and_then(|exports| exports.as_object().cloned())
//!     .ok_or("store not found")?;
//!
//! let busy = runtime
//!     .patcher()
//!     .instead(&store, "getState", |_, _| Ok(Value::from("busy")))?;
//! assert_eq!(store.call_method("getState", &[])?, Value::from("busy"));
//!
//! busy.unpatch();
//! assert_eq!(store.call_method("getState", &[])?, Value::from("idle"));
//! # Ok(())
//! # }
//! ```

mod error;
mod runtime;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{init_logging, init_logging_from_env, init_logging_with};

pub use error::{Error, Result};
pub use runtime::Runtime;

// Re-export primary APIs
pub use modhook_config::{ConfigError, FinderConfig, LogLevel, LoggingConfig, ModhookConfig};
pub use modhook_finder::{
    CacheEntry, CacheSnapshot, DepSlot, DependencyPattern, Filter, FilterGenerator, Finder,
    FinderSettings, GetModuleOptions, LookupCache, LookupMatch, LookupOptions, Lookups, MatchFlag,
    RelativeId, WaitOptions, cache, deps, filters,
};
pub use modhook_patcher::{AfterHook, BeforeHook, InsteadHook, Next, PatchError, Patcher, Unpatch};
pub use modhook_registry::{
    FactoryContext, ModuleId, ModuleRecord, ModuleRegistry, ModuleState, RegistryError,
    Subscription,
};
pub use modhook_value::{CallError, CallResult, Function, Object, Value};

// Member crates, for anything not re-exported above
pub use modhook_config;
pub use modhook_finder;
pub use modhook_patcher;
pub use modhook_registry;
pub use modhook_value;
