#![forbid(unsafe_code)]

//! Single-value cells with change notification.
//!
//! # Design
//!
//! [`Observable<T>`] keeps its value in shared, reference-counted storage next
//! to a [`Signal<T>`]. Every write stores the value and then notifies, even
//! when the new value equals the old one. Equality suppression is an opt-in
//! derived node ([`distinct_until_changed`](crate::combinator::CellExt::distinct_until_changed)).
//!
//! [`ReadCell`] is the read-only contract shared by `Observable<T>` and every
//! derived node, which is what lets the combinators chain.
//!
//! # Invariants
//!
//! 1. A write is visible through [`get()`](Observable::get) before any
//!    subscriber of that write runs.
//! 2. Subscribers are notified in registration order.
//! 3. The cell never disposes subscriptions on its own; callers dispose the
//!    [`Disposable`] they were handed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::disposable::Disposable;
use crate::signal::Signal;

/// Read-only view of a value that can change over time.
pub trait ReadCell: Clone + 'static {
    /// Type of the value carried by the cell.
    type Value: Clone + 'static;

    /// Current value. Derived nodes recompute it from their sources on every
    /// call, so the result is never stale.
    fn value(&self) -> Self::Value;

    /// Register `on_next` for every subsequent change.
    fn subscribe<F>(&self, on_next: F) -> Disposable
    where
        F: Fn(&Self::Value) + 'static;

    /// Subscribe, then immediately invoke `on_next` with the current value.
    ///
    /// The two steps are independent: the initial call reads
    /// [`value()`](Self::value) after the subscription is in place.
    fn subscribe_and_call<F>(&self, on_next: F) -> Disposable
    where
        F: Fn(&Self::Value) + 'static,
    {
        let on_next = Rc::new(on_next);
        let handler = Rc::clone(&on_next);
        let subscription = self.subscribe(move |v| handler(v));
        on_next(&self.value());
        subscription
    }
}

struct ObservableInner<T> {
    value: RefCell<T>,
    changed: Signal<T>,
}

/// A mutable value that notifies on every write.
///
/// Cloning an `Observable` creates a new handle to the **same** value.
pub struct Observable<T> {
    inner: Rc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.changed.len())
            .finish()
    }
}

impl<T: Clone + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Create a cell holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                value: RefCell::new(value),
                changed: Signal::new(),
            }),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Access the current value by reference.
    ///
    /// # Panics
    ///
    /// Panics if the closure writes to the same cell (re-entrant borrow).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Store `value` and notify every subscriber, equal or not.
    pub fn set(&self, value: T) {
        let _ = self.replace(value);
    }

    /// Store `value`, notify, and return the previous value.
    pub fn replace(&self, value: T) -> T {
        let snapshot = value.clone();
        let previous = self.inner.value.replace(value);
        self.inner.changed.execute(&snapshot);
        previous
    }

    /// Mutate the value in place, then notify.
    ///
    /// # Panics
    ///
    /// Panics if the closure reads or writes the same cell (re-entrant
    /// borrow). Subscribers run after the borrow is released and may access
    /// the cell freely.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let snapshot = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value);
            value.clone()
        };
        self.inner.changed.execute(&snapshot);
    }

    /// Register `on_change` for every subsequent write.
    pub fn subscribe(&self, on_change: impl Fn(&T) + 'static) -> Disposable {
        self.inner.changed.add(on_change)
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.changed.len()
    }
}

impl<T: Clone + 'static> ReadCell for Observable<T> {
    type Value = T;

    fn value(&self) -> T {
        self.get()
    }

    fn subscribe<F>(&self, on_next: F) -> Disposable
    where
        F: Fn(&T) + 'static,
    {
        Observable::subscribe(self, on_next)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
