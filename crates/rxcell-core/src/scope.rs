#![forbid(unsafe_code)]

//! Composite-disposal registry.
//!
//! A [`Subscriptions`] scope collects the [`Disposable`]s produced while
//! binding one element and tears all of them down with a single
//! [`dispose()`](Subscriptions::dispose). Scopes nest: an inner scope becomes
//! one entry of an outer scope through
//! [`into_disposable()`](Subscriptions::into_disposable).
//!
//! # Handles
//!
//! Entries are keyed by [`SubscriptionHandle`]s drawn from a counter that
//! starts at 1. The zero handle, [`SubscriptionHandle::INVALID`], is the
//! `Default` and never names an entry.
//!
//! # Lifecycle
//!
//! `Open -> Disposed`, terminal. Disposal marks the scope disposed, takes the
//! current entries, then disposes them in handle order with no borrow held,
//! so disposers may call back into the scope. Adds that arrive after disposal
//! follow the scope's [`AfterDispose`] policy. Disposing again is a no-op.
//! Dropping the last handle to an open scope disposes its entries.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::config::{AfterDispose, ScopeConfig};
use crate::disposable::Disposable;
use crate::error::{ReactiveError, Result};
use crate::logging::debug;

/// Opaque key of one scope entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Sentinel that never refers to an entry.
    pub const INVALID: Self = Self(0);

    /// Whether this handle could refer to an entry.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Get the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

struct ScopeState {
    entries: BTreeMap<SubscriptionHandle, Disposable>,
    next_handle: u64,
    disposed: bool,
    config: ScopeConfig,
}

/// Registry of disposables torn down together.
///
/// Cloning a `Subscriptions` creates a new handle to the **same** scope.
#[derive(Clone)]
pub struct Subscriptions {
    inner: Rc<RefCell<ScopeState>>,
}

impl Default for Subscriptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("Subscriptions")
            .field("entries", &state.entries.len())
            .field("disposed", &state.disposed)
            .field("config", &state.config)
            .finish()
    }
}

impl Subscriptions {
    /// Create an open scope with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ScopeConfig::default())
    }

    /// Create an open scope.
    #[must_use]
    pub fn with_config(config: ScopeConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ScopeState {
                entries: BTreeMap::new(),
                next_handle: 1,
                disposed: false,
                config,
            })),
        }
    }

    /// Register `disposable` and return its handle.
    ///
    /// On a disposed scope with [`AfterDispose::DisposeImmediately`], the
    /// disposable is disposed at once and [`SubscriptionHandle::INVALID`] is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`ReactiveError::InvalidArgument`] if `disposable` was already
    ///   disposed.
    /// - [`ReactiveError::ScopeDisposed`] on a disposed scope with
    ///   [`AfterDispose::Reject`].
    pub fn add(&self, disposable: Disposable) -> Result<SubscriptionHandle> {
        if disposable.is_disposed() {
            return Err(ReactiveError::invalid(
                "cannot register an already-disposed disposable",
            ));
        }

        let mut disposable = disposable;
        let policy = {
            let mut state = self.inner.borrow_mut();
            if !state.disposed {
                let handle = SubscriptionHandle(state.next_handle);
                state.next_handle += 1;
                state.entries.insert(handle, disposable);
                return Ok(handle);
            }
            state.config.after_dispose
        };

        debug!(?policy, "add on disposed scope");
        match policy {
            AfterDispose::DisposeImmediately => {
                disposable.dispose()?;
                Ok(SubscriptionHandle::INVALID)
            }
            AfterDispose::Reject => Err(ReactiveError::ScopeDisposed),
        }
    }

    /// Excise the entry for `handle` without disposing it.
    ///
    /// The registration it tracked stays live. Returns `false` if the handle
    /// names no entry.
    pub fn remove(&self, handle: SubscriptionHandle) -> bool {
        match self.take(handle) {
            Some(disposable) => {
                disposable.detach();
                true
            }
            None => false,
        }
    }

    /// Excise the entry for `handle` and hand its disposable back.
    pub fn take(&self, handle: SubscriptionHandle) -> Option<Disposable> {
        self.inner.borrow_mut().entries.remove(&handle)
    }

    /// Whether `handle` names a live entry.
    #[must_use]
    pub fn contains(&self, handle: SubscriptionHandle) -> bool {
        self.inner.borrow().entries.contains_key(&handle)
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Whether the scope holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Whether [`dispose()`](Self::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }

    /// Dispose every entry, in handle order, and close the scope.
    pub fn dispose(&self) {
        let entries = {
            let mut state = self.inner.borrow_mut();
            state.disposed = true;
            mem::take(&mut state.entries)
        };
        debug!(entries = entries.len(), "dispose scope");
        for (_, mut entry) in entries {
            let _ = entry.dispose();
        }
    }

    /// Wrap the scope so it can be registered in an outer scope.
    pub fn into_disposable(self) -> Disposable {
        Disposable::from_fn(move || self.dispose())
    }
}

impl From<Subscriptions> for Disposable {
    fn from(scope: Subscriptions) -> Self {
        scope.into_disposable()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn tracked(log: &Rc<RefCell<Vec<u32>>>, tag: u32) -> Disposable {
        let log = Rc::clone(log);
        Disposable::from_fn(move || log.borrow_mut().push(tag))
    }

    #[test]
    fn handles_start_at_one() {
        let scope = Subscriptions::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = scope.add(tracked(&log, 1)).unwrap();
        let second = scope.add(tracked(&log, 2)).unwrap();
        assert_eq!(first.raw(), 1);
        assert_eq!(second.raw(), 2);
        assert!(first.is_valid());
        assert!(!SubscriptionHandle::default().is_valid());
        assert_eq!(SubscriptionHandle::default(), SubscriptionHandle::INVALID);
    }

    #[test]
    fn dispose_runs_every_entry_in_order() {
        let scope = Subscriptions::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in 1..=3 {
            scope.add(tracked(&log, tag)).unwrap();
        }
        scope.dispose();
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
        assert!(scope.is_empty());
        assert!(scope.is_disposed());
    }

    #[test]
    fn remove_excises_without_disposing() {
        let scope = Subscriptions::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = scope.add(tracked(&log, 1)).unwrap();
        let _b = scope.add(tracked(&log, 2)).unwrap();

        assert!(scope.remove(a));
        assert!(!scope.remove(a));
        assert!(!scope.contains(a));
        scope.dispose();
        assert_eq!(*log.borrow(), vec![2]);
    }

    #[test]
    fn remove_out_of_order() {
        let scope = Subscriptions::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let handles: Vec<_> = (1..=4).map(|t| scope.add(tracked(&log, t)).unwrap()).collect();
        assert!(scope.remove(handles[2]));
        assert!(scope.remove(handles[0]));
        assert_eq!(scope.len(), 2);
        scope.dispose();
        assert_eq!(*log.borrow(), vec![2, 4]);
    }

    #[test]
    fn remove_invalid_handle_is_false() {
        let scope = Subscriptions::new();
        assert!(!scope.remove(SubscriptionHandle::INVALID));
        assert!(!scope.remove(SubscriptionHandle::default()));
    }

    #[test]
    fn take_returns_ownership() {
        let scope = Subscriptions::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let h = scope.add(tracked(&log, 7)).unwrap();
        let mut d = scope.take(h).unwrap();
        scope.dispose();
        assert!(log.borrow().is_empty());
        d.dispose().unwrap();
        assert_eq!(*log.borrow(), vec![7]);
    }

    #[test]
    fn add_rejects_disposed_disposable() {
        let scope = Subscriptions::new();
        let err = scope.add(Disposable::disposed()).unwrap_err();
        assert!(matches!(err, ReactiveError::InvalidArgument { .. }));
        assert!(scope.is_empty());
    }

    #[test]
    fn second_dispose_is_noop() {
        let scope = Subscriptions::new();
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        scope
            .add(Disposable::from_fn(move || c.set(c.get() + 1)))
            .unwrap();
        scope.dispose();
        scope.dispose();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn add_after_dispose_disposes_immediately_by_default() {
        let scope = Subscriptions::new();
        scope.dispose();
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = scope.add(tracked(&log, 1)).unwrap();
        assert_eq!(handle, SubscriptionHandle::INVALID);
        assert_eq!(*log.borrow(), vec![1]);
        assert!(scope.is_empty());
    }

    #[test]
    fn add_after_dispose_rejected_when_configured() {
        let scope =
            Subscriptions::with_config(ScopeConfig::default().with_after_dispose(AfterDispose::Reject));
        scope.dispose();
        let log = Rc::new(RefCell::new(Vec::new()));
        assert_eq!(
            scope.add(tracked(&log, 1)).unwrap_err(),
            ReactiveError::ScopeDisposed
        );
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn disposer_may_reenter_scope() {
        let scope = Subscriptions::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let reentrant = scope.clone();
        let late_log = Rc::clone(&log);
        let second = Rc::new(Cell::new(SubscriptionHandle::INVALID));
        let s = Rc::clone(&second);
        scope
            .add(Disposable::from_fn(move || {
                // Already taken by the disposal pass.
                assert!(!reentrant.remove(s.get()));
                let h = reentrant.add(tracked(&late_log, 99)).unwrap();
                assert!(!h.is_valid());
            }))
            .unwrap();
        second.set(scope.add(tracked(&log, 2)).unwrap());

        scope.dispose();
        assert_eq!(*log.borrow(), vec![99, 2]);
    }

    #[test]
    fn nested_scopes_unwind_together() {
        let outer = Subscriptions::new();
        let inner = Subscriptions::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        inner.add(tracked(&log, 1)).unwrap();
        inner.add(tracked(&log, 2)).unwrap();
        outer.add(tracked(&log, 0)).unwrap();
        outer.add(inner.clone().into()).unwrap();

        outer.dispose();
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert!(inner.is_disposed());
    }

    #[test]
    fn dropping_last_handle_disposes_entries() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let scope = Subscriptions::new();
            scope.add(tracked(&log, 5)).unwrap();
        }
        assert_eq!(*log.borrow(), vec![5]);
    }

    #[test]
    fn debug_format() {
        let scope = Subscriptions::new();
        let dbg = format!("{scope:?}");
        assert!(dbg.contains("Subscriptions"));
        assert!(dbg.contains("disposed: false"));
    }
}
