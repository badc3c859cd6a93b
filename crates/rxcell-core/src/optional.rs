#![forbid(unsafe_code)]

//! Value cells with an explicit empty state.
//!
//! [`OptionalObservable<T>`] holds either nothing or a value, and notifies on
//! two channels: "took a value" and "became empty". Unlike
//! [`Observable<T>`](crate::observable::Observable), it suppresses a write
//! whose value equals the one already held. Clearing always notifies, even
//! when the cell is already empty.
//!
//! [`ReadOptionalCell`] is the read-only contract for everything with that
//! shape: this cell, the optional combinators, and the per-element view of an
//! [`ObservableList`](crate::list::ObservableList).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::disposable::Disposable;
use crate::error::{ReactiveError, Result};
use crate::signal::Signal;

/// Read-only view of a value that may be absent.
pub trait ReadOptionalCell: Clone + 'static {
    /// Type of the value carried while non-empty.
    type Value: Clone + 'static;

    /// Current value, or `None` while empty.
    fn get(&self) -> Option<Self::Value>;

    /// Current value.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError::EmptyAccess`] while the cell is empty.
    fn value(&self) -> Result<Self::Value> {
        self.get().ok_or(ReactiveError::EmptyAccess)
    }

    /// Whether the cell currently holds a value.
    fn has_value(&self) -> bool {
        self.get().is_some()
    }

    /// Register `on_value` and `on_empty` together. Disposing the returned
    /// handle detaches both.
    fn subscribe<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&Self::Value) + 'static,
        E: Fn() + 'static;

    /// Subscribe, then immediately replay the current state to the matching
    /// callback.
    fn subscribe_and_call<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&Self::Value) + 'static,
        E: Fn() + 'static,
    {
        let on_value = Rc::new(on_value);
        let on_empty = Rc::new(on_empty);
        let (v, e) = (Rc::clone(&on_value), Rc::clone(&on_empty));
        let subscription = self.subscribe(move |value| v(value), move || e());
        match self.get() {
            Some(value) => on_value(&value),
            None => on_empty(),
        }
        subscription
    }
}

struct OptionalInner<T> {
    state: RefCell<Option<T>>,
    on_value: Signal<T>,
    on_empty: Signal<()>,
}

/// A mutable cell that is either empty or holds a value.
///
/// Cloning an `OptionalObservable` creates a new handle to the **same** state.
pub struct OptionalObservable<T> {
    inner: Rc<OptionalInner<T>>,
}

impl<T> Clone for OptionalObservable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OptionalObservable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionalObservable")
            .field("state", &self.inner.state.borrow())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Default for OptionalObservable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + 'static> From<Option<T>> for OptionalObservable<T> {
    fn from(state: Option<T>) -> Self {
        Self {
            inner: Rc::new(OptionalInner {
                state: RefCell::new(state),
                on_value: Signal::new(),
                on_empty: Signal::new(),
            }),
        }
    }
}

impl<T: Clone + PartialEq + 'static> OptionalObservable<T> {
    /// Create an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::from(None)
    }

    /// Create a cell holding `value`.
    #[must_use]
    pub fn with_value(value: T) -> Self {
        Self::from(Some(value))
    }

    /// Clone of the held value, or `None` while empty.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.inner.state.borrow().clone()
    }

    /// Clone of the held value.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError::EmptyAccess`] while the cell is empty.
    pub fn value(&self) -> Result<T> {
        self.get().ok_or(ReactiveError::EmptyAccess)
    }

    /// Whether the cell currently holds a value.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// Store `value` and fire the value channel.
    ///
    /// A write equal to the value already held is a no-op.
    pub fn set(&self, value: T) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.as_ref() == Some(&value) {
                return;
            }
            *state = Some(value.clone());
        }
        self.inner.on_value.execute(&value);
    }

    /// Become empty and fire the empty channel, even if already empty.
    pub fn clear(&self) {
        let _ = self.take();
    }

    /// Alias of [`clear()`](Self::clear).
    pub fn set_default(&self) {
        self.clear();
    }

    /// Become empty, fire the empty channel, and return what was held.
    pub fn take(&self) -> Option<T> {
        let previous = self.inner.state.borrow_mut().take();
        self.inner.on_empty.notify();
        previous
    }

    /// Register `on_value` and `on_empty` together.
    pub fn subscribe(
        &self,
        on_value: impl Fn(&T) + 'static,
        on_empty: impl Fn() + 'static,
    ) -> Disposable {
        Disposable::composite(vec![
            self.inner.on_value.add(on_value),
            self.inner.on_empty.add(move |_| on_empty()),
        ])
    }

    /// Number of active subscriptions (value and empty channels counted
    /// separately).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.on_value.len() + self.inner.on_empty.len()
    }
}

impl<T: Clone + PartialEq + 'static> ReadOptionalCell for OptionalObservable<T> {
    type Value = T;

    fn get(&self) -> Option<T> {
        OptionalObservable::get(self)
    }

    fn has_value(&self) -> bool {
        OptionalObservable::has_value(self)
    }

    fn subscribe<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&T) + 'static,
        E: Fn() + 'static,
    {
        OptionalObservable::subscribe(self, on_value, on_empty)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
