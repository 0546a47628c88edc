//! # modhook-patcher
//!
//! Splice hooks into method slots of shared objects without touching any
//! call site.
//!
//! The first hook on `object[key]` replaces the function in that slot with a
//! dispatcher. Every caller that looks the method up through the object from
//! then on goes through the dispatcher, which runs:
//!
//! ```text
//!   before hooks (newest first, may rewrite args)
//!     -> instead chain (newest outermost, original innermost)
//!   after hooks (newest first, may replace the result)
//! ```
//!
//! Each hook is removed independently through its [`Unpatch`] handle. When
//! the last hook on a slot goes away the original function is put back, the
//! very same [`Function`](modhook_value::Function) that was there before.
//!
//! ```rust
//! use modhook_patcher::Patcher;
//! use modhook_value::{Function, Object, Value};
//!
//! let greeter = Object::new().with(
//!     "greet",
//!     Function::named("greet", |args| {
//!         let name = args.first().and_then(Value::as_str).unwrap_or("nobody");
//!         Ok(Value::from(format!("hello {name}")))
//!     }),
//! );
//!
//! let patcher = Patcher::new();
//! let shout = patcher
//!     .after(&greeter, "greet", |_, result| {
//!         Ok(result.as_str().map(|s| Value::from(s.to_uppercase())))
//!     })
//!     .unwrap();
//!
//! let result = greeter.call_method("greet", &[Value::from("ada")]).unwrap();
//! assert_eq!(result, Value::from("HELLO ADA"));
//!
//! assert!(shout.unpatch());
//! assert!(!patcher.is_patched(&greeter, "greet"));
//! ```
//!
//! Hooks run without any patcher lock held, so a hook may install or remove
//! hooks, including itself, while a call is in flight; the call finishes
//! with the hooks that were installed when it started.

mod chain;
mod error;
mod patcher;
mod state;

pub use error::{PatchError, Result};
pub use patcher::{Patcher, Unpatch};
pub use state::{AfterHook, BeforeHook, InsteadHook, Next};

#[cfg(test)]
mod tests;
