//! # modhook-value
//!
//! The opaque value model shared by every modhook crate.
//!
//! Module exports are not typed Rust structs: the finder only ever asks
//! structural questions about them ("does this have a `createElement`
//! property?", "what is this function called?"), and the patcher only ever
//! swaps the callable stored in a property slot. This crate provides exactly
//! that surface:
//!
//! - [`Value`] - a dynamically-typed value (scalars, objects, functions)
//! - [`Object`] - a shared, insertion-ordered property table
//! - [`Function`] - a shared callable with an optional declared name
//!
//! Objects and functions have reference semantics: cloning a handle clones
//! the `Arc`, and [`Object::ptr_eq`] / [`Function::ptr_eq`] compare identity.
//!
//! ```rust
//! use modhook_value::{Function, Object, Value};
//!
//! let exports = Object::new()
//!     .with("version", 3)
//!     .with("greet", Function::named("greet", |args| {
//!         Ok(Value::from(format!("hello {}", args.len())))
//!     }));
//!
//! let value = Value::from(exports.clone());
//! assert!(value.has_property("greet"));
//! assert_eq!(exports.call_method("greet", &[]).unwrap(), Value::from("hello 0"));
//! ```

mod error;
mod function;
mod object;
mod value;

pub use error::CallError;
pub use function::{Function, NativeFn};
pub use object::Object;
pub use value::Value;

/// Result of invoking a [`Function`].
pub type CallResult = std::result::Result<Value, CallError>;
