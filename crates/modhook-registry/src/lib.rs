//! # modhook-registry
//!
//! A lazily-initialising module table addressed by numeric ids, plus the
//! lifecycle event streams the finder consumes.
//!
//! ## Overview
//!
//! Each module is defined once with an immutable dependency list and a
//! factory. The factory runs on the first [`ModuleRegistry::require`]; its
//! return value becomes the module's exports. Three events are observable:
//!
//! - **first-required** - the module is about to run its factory
//! - **finished-importing** - the running module resolved its source path
//! - **initialized** - exports are available
//!
//! ```text
//!   define ──► Unrequired ──require──► Requiring ──factory ok──► Initialized
//!                               │                    │
//!                        first-required     finished-importing      initialized
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use modhook_registry::{ModuleId, ModuleRegistry};
//! use modhook_value::{Object, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ModuleRegistry::new();
//! let logger = ModuleId::new(5);
//!
//! registry.define(logger, [], |ctx| {
//!     ctx.finished_importing("modules/debug/Logger.tsx")?;
//!     Ok(Value::from(Object::new().with("log", true)))
//! })?;
//!
//! let _subscription = registry.on_initialized(logger, |id, exports| {
//!     assert!(exports.has_property("log"));
//!     println!("module {id} initialized");
//! });
//!
//! registry.require(logger)?;
//! assert!(registry.is_initialized(logger));
//! assert_eq!(registry.module_id_by_imported_path("modules/debug/Logger.tsx"), Some(logger));
//! # Ok(())
//! # }
//! ```
//!
//! ## Re-entrancy
//!
//! Locks are never held while factories or subscribers run. Subscriber sets
//! are snapshotted before dispatch, so a subscriber may unsubscribe itself
//! or register new subscribers mid-dispatch. A panicking subscriber is
//! logged and does not prevent delivery to the others.

mod error;
mod factory;
mod module_id;
mod record;
mod registry;
mod subscription;

pub use error::{RegistryError, Result};
pub use factory::{FactoryContext, ModuleFactory};
pub use module_id::ModuleId;
pub use record::{ModuleRecord, ModuleState};
pub use registry::{ModuleRegistry, WeakModuleRegistry};
pub use subscription::Subscription;

#[cfg(test)]
mod tests;
