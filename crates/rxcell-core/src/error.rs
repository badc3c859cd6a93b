#![forbid(unsafe_code)]

//! Error type shared by every reactive primitive.
//!
//! All variants are local contract violations: none of them is transient, and
//! nothing in this crate retries or suppresses them.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReactiveError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    /// The value of an optional cell was read while it was empty.
    #[error("optional value read while empty")]
    EmptyAccess,

    /// A position argument fell outside the valid range for the operation.
    #[error("position {index} out of range (length {len})")]
    OutOfRange { index: usize, len: usize },

    /// A registration API was handed something it cannot register.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A disposable was disposed a second time.
    #[error("disposable already disposed")]
    AlreadyDisposed,

    /// A subscription scope refused an entry because it has been disposed.
    #[error("subscription scope already disposed")]
    ScopeDisposed,
}

impl ReactiveError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }
}
