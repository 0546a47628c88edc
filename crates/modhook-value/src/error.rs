//! Errors raised by calling into the value model.

use thiserror::Error;

/// Failure of a call through a [`Function`](crate::Function).
///
/// `Thrown` is the equivalent of an exception escaping a callee. It is what
/// hooks return to abort a patched call, and what the patcher propagates
/// untouched back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("{0}")]
    Thrown(String),

    #[error("property `{0}` is not callable")]
    NotCallable(String),

    #[error("expected at least {expected} argument(s), got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
}

impl CallError {
    /// Convenience constructor for [`CallError::Thrown`].
    pub fn thrown(message: impl Into<String>) -> Self {
        Self::Thrown(message.into())
    }
}
