//! Error types for installing patches.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PatchError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The slot is missing or holds something other than a function.
    #[error("property `{key}` does not hold a function")]
    NotAFunction { key: String },
}
