//
// Copyright (c) 2025 Nathan Fiedler
//

//! Error types for the succinct array.

use std::alloc::Layout;
use std::fmt;
use thiserror::Error;

/// Error variants for operations that allocate or inspect the array.
#[derive(Debug, Error)]
pub enum Error {
    /// The allocator was unable to provide a block with the given layout.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocFailed { layout: Layout },

    /// The requested number of slots cannot be represented as a layout.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The internal state of the array does not satisfy one of its
    /// structural rules.
    #[error("invariant violated: {0}")]
    InvariantViolated(&'static str),
}

/// A specialized Result type for succinct array operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned by `try_push()` when the array could not make room for another
/// element. The array is unchanged and the value is handed back.
#[derive(Error)]
#[error("failed to push value: {error}")]
pub struct PushError<T> {
    value: T,
    #[source]
    error: Error,
}

impl<T> PushError<T> {
    pub(crate) fn new(value: T, error: Error) -> Self {
        Self { value, error }
    }

    /// Recover the value that could not be pushed.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// The allocation error that caused the push to fail.
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Split into the rejected value and the error.
    pub fn into_parts(self) -> (T, Error) {
        (self.value, self.error)
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
