//! # modhook-finder
//!
//! Finds modules in a [`ModuleRegistry`] by what they look like rather than
//! by name.
//!
//! ## Overview
//!
//! - [`filters`] - composable predicates with stable cache keys
//! - [`deps`] - dependency-list shape patterns
//! - [`Finder::lookup`] / [`Finder::lookup_many`] - cached synchronous search
//! - [`Finder::wait_for_modules`] / [`Finder::get_module`] - callbacks for
//!   modules that initialize later
//!
//! ## Quick Start
//!
//! ```rust
//! use modhook_finder::{filters, Finder, GetModuleOptions, LookupOptions};
//! use modhook_registry::{ModuleId, ModuleRegistry};
//! use modhook_value::{Function, Object, Value};
//!
//! let registry = ModuleRegistry::new();
//! registry
//!     .define_value(
//!         ModuleId::new(1),
//!         [],
//!         Object::new().with("createElement", Function::new(|_| Ok(Value::Null))),
//!     )
//!     .unwrap();
//! registry.require(ModuleId::new(1)).unwrap();
//!
//! let finder = Finder::new(registry.clone());
//! let react = filters::with_props(["createElement"]);
//!
//! let found = finder.lookup(&react, LookupOptions::default()).unwrap();
//! assert_eq!(found.id, ModuleId::new(1));
//!
//! // Modules that do not exist yet are delivered when they initialize.
//! let logger = filters::with_name("Logger");
//! let _subscription = finder.get_module(
//!     &logger,
//!     |exports, id| println!("logger {id}: {exports:?}"),
//!     GetModuleOptions::default(),
//! );
//! ```
//!
//! ## Caching
//!
//! Lookup results are memoized per filter key. A lookup restricted to a
//! subset of modules may therefore serve results that a later, wider lookup
//! would extend; only a full scan records that a key matches nothing.

pub mod cache;
pub mod deps;
pub mod filters;
mod finder;
mod get;
mod lookup;
mod wait;

pub use cache::{CacheEntry, CacheSnapshot, LookupCache, MatchFlag};
pub use deps::{DepSlot, DependencyPattern, RelativeId};
pub use filters::{Filter, FilterGenerator};
pub use finder::{Finder, FinderSettings};
pub use get::GetModuleOptions;
pub use lookup::{LookupMatch, LookupOptions, Lookups};
pub use wait::WaitOptions;

#[cfg(test)]
mod tests;
