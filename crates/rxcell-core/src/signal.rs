#![forbid(unsafe_code)]

//! Multicast callback register.
//!
//! [`Signal<A>`] is the notification primitive every cell, list and derived
//! node is built on. Arguments travel as one value `A`: `()` for no arguments,
//! `T` for one, and a tuple such as `(usize, T)` or `(usize, T, T)` for two or
//! three. Callbacks receive `&A`.
//!
//! # Notification policy
//!
//! [`execute()`](Signal::execute) snapshots the registrant list before calling
//! anyone. A callback added during the pass does not receive the event already
//! in flight, and a callback removed during the pass still receives it if it
//! was captured in the snapshot. No borrow is held while callbacks run, so
//! callbacks may freely add, remove or re-execute.
//!
//! # Failure Modes
//!
//! - **Callback panics**: the panic propagates out of `execute()` and the
//!   remaining registrants of that pass are not called. Subscribers are not
//!   isolated from each other. The signal itself stays usable afterwards.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::disposable::Disposable;
use crate::logging::trace;

/// A shared callback, comparable by identity with [`Rc::ptr_eq`].
pub type Callback<A> = Rc<dyn Fn(&A)>;

struct Registration<A> {
    id: u64,
    callback: Callback<A>,
}

struct SignalInner<A> {
    registrations: Vec<Registration<A>>,
    next_id: u64,
}

impl<A> SignalInner<A> {
    fn push(&mut self, callback: Callback<A>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.registrations.push(Registration { id, callback });
        id
    }

    fn remove_id(&mut self, id: u64) {
        if let Some(index) = self.registrations.iter().position(|r| r.id == id) {
            self.registrations.remove(index);
        }
    }
}

/// Multicast callback register.
///
/// Cloning a `Signal` creates a new handle to the **same** registrant list.
pub struct Signal<A = ()> {
    inner: Rc<RefCell<SignalInner<A>>>,
}

impl<A> Clone for Signal<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> Default for Signal<A> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                registrations: Vec::new(),
                next_id: 0,
            })),
        }
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("registrations", &self.len())
            .finish()
    }
}

impl<A: 'static> Signal<A> {
    /// Create an empty signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    ///
    /// Every call creates an independent registration. The returned handle
    /// removes exactly this registration when disposed.
    pub fn add(&self, callback: impl Fn(&A) + 'static) -> Disposable {
        self.add_shared(&(Rc::new(callback) as Callback<A>))
    }

    /// Register a shared callback so it can later be removed by identity with
    /// [`remove()`](Self::remove).
    pub fn add_shared(&self, callback: &Callback<A>) -> Disposable {
        let id = self.inner.borrow_mut().push(Rc::clone(callback));
        let weak: Weak<RefCell<SignalInner<A>>> = Rc::downgrade(&self.inner);
        Disposable::from_fn(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().remove_id(id);
            }
        })
    }

    /// Remove the first registration of `callback`, compared by identity.
    ///
    /// Returns `false` if the callback is not registered.
    pub fn remove(&self, callback: &Callback<A>) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner
            .registrations
            .iter()
            .position(|r| Rc::ptr_eq(&r.callback, callback))
        {
            Some(index) => {
                inner.registrations.remove(index);
                true
            }
            None => false,
        }
    }

    /// Invoke every callback registered at the start of this call.
    pub fn execute(&self, args: &A) {
        let snapshot: Vec<Callback<A>> = self
            .inner
            .borrow()
            .registrations
            .iter()
            .map(|r| Rc::clone(&r.callback))
            .collect();
        trace!(registrants = snapshot.len(), "signal execute");
        for callback in snapshot {
            callback(args);
        }
    }

    /// Drop every registration. Outstanding handles become no-ops.
    pub fn clear(&self) {
        self.inner.borrow_mut().registrations.clear();
    }
}

impl<A> Signal<A> {
    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().registrations.len()
    }

    /// Whether no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().registrations.is_empty()
    }
}

impl Signal<()> {
    /// Execute a zero-argument signal.
    pub fn notify(&self) {
        self.execute(&());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
