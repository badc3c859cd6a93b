#![forbid(unsafe_code)]

//! Disposal handles returned by every registration API.
//!
//! A [`Disposable`] owns exactly one disposal action. The action runs on the
//! first [`dispose()`](Disposable::dispose); a second call is a lifetime bug in
//! the caller and reports [`ReactiveError::AlreadyDisposed`] instead of
//! silently succeeding.
//!
//! # Invariants
//!
//! 1. The disposal action runs at most once.
//! 2. Dropping a live `Disposable` runs its action (RAII, like a
//!    subscription guard). [`detach()`](Disposable::detach) opts out.
//! 3. A composite disposes its parts in the order they were given.

use std::fmt;
use std::mem;

use crate::error::{ReactiveError, Result};

enum DisposeState {
    Live(Box<dyn FnOnce()>),
    Disposed,
}

/// Handle that tears down one registration (or a group of them).
#[must_use = "dropping a Disposable disposes it immediately"]
pub struct Disposable {
    state: DisposeState,
}

impl Disposable {
    /// Wrap an arbitrary disposal action.
    pub fn from_fn(action: impl FnOnce() + 'static) -> Self {
        Self {
            state: DisposeState::Live(Box::new(action)),
        }
    }

    /// A handle that has already been disposed.
    ///
    /// Registration APIs reject it as an invalid argument.
    pub fn disposed() -> Self {
        Self {
            state: DisposeState::Disposed,
        }
    }

    /// Group several disposables behind one handle.
    ///
    /// Parts that are already disposed are skipped when the composite is
    /// disposed.
    pub fn composite(parts: Vec<Disposable>) -> Self {
        Self::from_fn(move || {
            for mut part in parts {
                if !part.is_disposed() {
                    let _ = part.dispose();
                }
            }
        })
    }

    /// Whether the disposal action has already run (or was detached).
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        matches!(self.state, DisposeState::Disposed)
    }

    /// Run the disposal action.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError::AlreadyDisposed`] if this handle was disposed
    /// before.
    pub fn dispose(&mut self) -> Result<()> {
        match mem::replace(&mut self.state, DisposeState::Disposed) {
            DisposeState::Live(action) => {
                action();
                Ok(())
            }
            DisposeState::Disposed => Err(ReactiveError::AlreadyDisposed),
        }
    }

    /// Give up the handle without running the disposal action.
    ///
    /// Whatever the action would have torn down stays registered for the rest
    /// of its owner's lifetime. The boxed action itself is leaked so that
    /// anything it captured (nested disposables included) is never dropped.
    pub fn detach(mut self) {
        if let DisposeState::Live(action) = mem::replace(&mut self.state, DisposeState::Disposed) {
            mem::forget(action);
        }
    }
}

impl Drop for Disposable {
    fn drop(&mut self) {
        if let DisposeState::Live(action) = mem::replace(&mut self.state, DisposeState::Disposed) {
            action();
        }
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
