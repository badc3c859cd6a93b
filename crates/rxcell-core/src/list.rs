#![forbid(unsafe_code)]

//! Index-addressable observable sequence with stable per-element identity.
//!
//! # Design
//!
//! Every element receives a [`StableId`] when it enters the list. Ids are
//! allocated from a counter and never reused. Two tables tie ids to
//! positions:
//!
//! - `ids[position] -> StableId` for the live elements, parallel to the
//!   backing `Vec<T>`;
//! - `positions: StableId -> position` for the same elements. A removed id
//!   has no entry, which is its tombstone.
//!
//! Both tables only ever hold live elements, so their size follows `len()`
//! rather than the number of elements ever inserted. Inserting or removing
//! shifts the `positions` entries of every element after the mutation point.
//! A tombstone is terminal: a removed id never maps to a position again.
//!
//! [`get_observable()`](ObservableList::get_observable) resolves a position to
//! its id once, at call time, and returns a [`ListItem`] keyed by that id. The
//! item keeps following its element through later inserts and removes
//! elsewhere in the list.
//!
//! # Notifications
//!
//! - `item_added(position, value)` after an append or insert.
//! - `item_removed(position, value)` after a removal. [`clear()`](ObservableList::clear)
//!   takes the elements off the back one at a time and fires it once per
//!   element, in descending position order. Elements not yet removed stay
//!   readable, and elements added by a subscriber during the clear are
//!   removed (and reported) in turn.
//! - `item_set(position, old, new)` **before** the new value becomes visible.
//!
//! Per-element items fire their value channel after their element is set,
//! and their empty channel exactly once, after the list-level removal event.
//!
//! # Failure Modes
//!
//! - **Out-of-range position**: the operation returns
//!   [`ReactiveError::OutOfRange`] and the list is left untouched.
//! - **Element removed during an `item_set` notification**: the pending
//!   write is dropped, since its target no longer exists.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::config::ListConfig;
use crate::disposable::Disposable;
use crate::error::{ReactiveError, Result};
use crate::logging::trace;
use crate::optional::ReadOptionalCell;
use crate::signal::Signal;

/// Position-independent identity of a list element.
///
/// Assigned when the element is added or inserted; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StableId(u64);

impl StableId {
    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

}

struct ElementChannel<T> {
    on_value: Signal<T>,
    on_empty: Signal<()>,
}

impl<T: 'static> ElementChannel<T> {
    fn new() -> Self {
        Self {
            on_value: Signal::new(),
            on_empty: Signal::new(),
        }
    }
}

struct ListState<T> {
    items: Vec<T>,
    ids: Vec<StableId>,
    /// Live elements only. A missing id is a tombstone.
    positions: AHashMap<StableId, usize>,
    watchers: AHashMap<StableId, Rc<ElementChannel<T>>>,
    next_id: u64,
}

impl<T> ListState<T> {
    fn allocate(&mut self) -> StableId {
        let id = StableId(self.next_id);
        self.next_id += 1;
        id
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(ReactiveError::out_of_range(index, self.items.len()))
        }
    }

    /// Rewrite `positions` for every live element from `from` onwards.
    fn reindex_from(&mut self, from: usize) {
        for (offset, id) in self.ids[from..].iter().enumerate() {
            self.positions.insert(*id, from + offset);
        }
    }

    fn position_of(&self, id: StableId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    fn tombstone(&mut self, id: StableId) -> Option<Rc<ElementChannel<T>>> {
        self.positions.remove(&id);
        self.watchers.remove(&id)
    }
}

struct ListInner<T> {
    state: RefCell<ListState<T>>,
    item_added: Signal<(usize, T)>,
    item_removed: Signal<(usize, T)>,
    item_set: Signal<(usize, T, T)>,
}

/// Observable sequence with stable per-element observables.
///
/// Cloning an `ObservableList` creates a new handle to the **same** list.
pub struct ObservableList<T> {
    inner: Rc<ListInner<T>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ObservableList")
            .field("items", &state.items)
            .field("ids", &state.ids)
            .finish()
    }
}

impl<T: Clone + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> FromIterator<T> for ObservableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let list = Self::new();
        {
            let mut state = list.inner.state.borrow_mut();
            for item in iter {
                let id = state.allocate();
                let position = state.items.len();
                state.items.push(item);
                state.ids.push(id);
                state.positions.insert(id, position);
            }
        }
        list
    }
}

impl<T: Clone + 'static> ObservableList<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ListConfig::default())
    }

    /// Create an empty list with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(ListConfig::default().with_capacity(capacity))
    }

    /// Create an empty list from a configuration.
    #[must_use]
    pub fn with_config(config: ListConfig) -> Self {
        Self {
            inner: Rc::new(ListInner {
                state: RefCell::new(ListState {
                    items: Vec::with_capacity(config.capacity),
                    ids: Vec::with_capacity(config.capacity),
                    positions: AHashMap::with_capacity(config.capacity),
                    watchers: AHashMap::new(),
                    next_id: 0,
                }),
                item_added: Signal::new(),
                item_removed: Signal::new(),
                item_set: Signal::new(),
            }),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.borrow().items.len()
    }

    /// Whether the list has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().items.is_empty()
    }

    /// Clone of the element at `position`, if any.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<T> {
        self.inner.state.borrow().items.get(position).cloned()
    }

    /// Clone of every element, in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.state.borrow().items.clone()
    }

    /// Access the elements by reference.
    ///
    /// # Panics
    ///
    /// Panics if the closure mutates the same list (re-entrant borrow).
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.state.borrow().items)
    }

    /// Append `item` and fire `item_added`.
    pub fn push(&self, item: T) {
        let position = {
            let mut state = self.inner.state.borrow_mut();
            let id = state.allocate();
            let position = state.items.len();
            state.items.push(item.clone());
            state.ids.push(id);
            state.positions.insert(id, position);
            position
        };
        trace!(position, "list push");
        self.inner.item_added.execute(&(position, item));
    }

    /// Insert `item` at `position`, shifting later elements up.
    ///
    /// `position == len()` appends.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError::OutOfRange`] if `position > len()`.
    pub fn insert(&self, position: usize, item: T) -> Result<()> {
        {
            let mut state = self.inner.state.borrow_mut();
            let len = state.items.len();
            if position > len {
                return Err(ReactiveError::out_of_range(position, len));
            }
            let id = state.allocate();
            state.items.insert(position, item.clone());
            state.ids.insert(position, id);
            state.reindex_from(position);
        }
        trace!(position, "list insert");
        self.inner.item_added.execute(&(position, item));
        Ok(())
    }

    /// Remove and return the element at `position`, shifting later elements
    /// down. Its id is tombstoned.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError::OutOfRange`] if `position >= len()`.
    pub fn remove_at(&self, position: usize) -> Result<T> {
        let (removed, watcher) = {
            let mut state = self.inner.state.borrow_mut();
            state.check_index(position)?;
            let removed = state.items.remove(position);
            let id = state.ids.remove(position);
            let watcher = state.tombstone(id);
            state.reindex_from(position);
            (removed, watcher)
        };
        trace!(position, "list remove");
        self.inner.item_removed.execute(&(position, removed.clone()));
        if let Some(channel) = watcher {
            channel.on_empty.notify();
        }
        Ok(removed)
    }

    /// Replace the element at `position` and return the old value.
    ///
    /// `item_set` fires before the write, so its subscribers still read the
    /// old value through [`get()`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError::OutOfRange`] if `position >= len()`.
    pub fn set(&self, position: usize, value: T) -> Result<T> {
        let (id, old) = {
            let state = self.inner.state.borrow();
            state.check_index(position)?;
            (state.ids[position], state.items[position].clone())
        };
        self.inner
            .item_set
            .execute(&(position, old.clone(), value.clone()));

        let watcher = {
            let mut state = self.inner.state.borrow_mut();
            let Some(current) = state.position_of(id) else {
                return Ok(old);
            };
            state.items[current] = value.clone();
            state.watchers.get(&id).cloned()
        };
        trace!(position, "list set");
        if let Some(channel) = watcher {
            channel.on_value.execute(&value);
        }
        Ok(old)
    }

    /// Remove every element.
    ///
    /// Elements are taken off the back one at a time. Each one is removed
    /// from the store before its `item_removed` fires, exactly as
    /// [`remove_at()`](Self::remove_at) does, so subscribers see the
    /// remaining elements and may mutate the list. The loop runs until the
    /// list is empty, which includes anything added during the clear.
    pub fn clear(&self) {
        trace!(len = self.len(), "list clear");
        loop {
            let (position, value, watcher) = {
                let mut state = self.inner.state.borrow_mut();
                let (Some(id), Some(value)) = (state.ids.pop(), state.items.pop()) else {
                    break;
                };
                let position = state.items.len();
                (position, value, state.tombstone(id))
            };
            self.inner.item_removed.execute(&(position, value));
            if let Some(channel) = watcher {
                channel.on_empty.notify();
            }
        }
    }

    /// Stable id of the element currently at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError::OutOfRange`] if `position >= len()`.
    pub fn stable_id(&self, position: usize) -> Result<StableId> {
        let state = self.inner.state.borrow();
        state.check_index(position)?;
        Ok(state.ids[position])
    }

    /// Current position of `id`, or `None` once it has been removed.
    #[must_use]
    pub fn position_of(&self, id: StableId) -> Option<usize> {
        self.inner.state.borrow().position_of(id)
    }

    /// Per-element observable for the element currently at `position`.
    ///
    /// The returned item follows the element, not the position.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError::OutOfRange`] if `position >= len()`.
    pub fn get_observable(&self, position: usize) -> Result<ListItem<T>> {
        let mut state = self.inner.state.borrow_mut();
        state.check_index(position)?;
        let id = state.ids[position];
        let channel = Rc::clone(
            state
                .watchers
                .entry(id)
                .or_insert_with(|| Rc::new(ElementChannel::new())),
        );
        Ok(ListItem {
            list: Rc::downgrade(&self.inner),
            id,
            channel,
        })
    }

    /// Fired with `(position, value)` after an element is added.
    #[must_use]
    pub fn item_added(&self) -> &Signal<(usize, T)> {
        &self.inner.item_added
    }

    /// Fired with `(position, value)` after an element is removed.
    #[must_use]
    pub fn item_removed(&self) -> &Signal<(usize, T)> {
        &self.inner.item_removed
    }

    /// Fired with `(position, old, new)` before an element is replaced.
    #[must_use]
    pub fn item_set(&self) -> &Signal<(usize, T, T)> {
        &self.inner.item_set
    }
}

/// Optional observable over one list element, keyed by its [`StableId`].
///
/// Holds a value while the element is live. Becomes empty, permanently, when
/// the element is removed or the list is dropped.
pub struct ListItem<T> {
    list: Weak<ListInner<T>>,
    id: StableId,
    channel: Rc<ElementChannel<T>>,
}

impl<T> Clone for ListItem<T> {
    fn clone(&self) -> Self {
        Self {
            list: Weak::clone(&self.list),
            id: self.id,
            channel: Rc::clone(&self.channel),
        }
    }
}

impl<T> fmt::Debug for ListItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListItem").field("id", &self.id).finish()
    }
}

impl<T: Clone + 'static> ListItem<T> {
    /// The element's stable id.
    #[must_use]
    pub fn stable_id(&self) -> StableId {
        self.id
    }

    /// The element's current position, or `None` once removed.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.list
            .upgrade()
            .and_then(|list| list.state.borrow().position_of(self.id))
    }
}

impl<T: Clone + 'static> ReadOptionalCell for ListItem<T> {
    type Value = T;

    fn get(&self) -> Option<T> {
        let list = self.list.upgrade()?;
        let state = list.state.borrow();
        let position = state.position_of(self.id)?;
        Some(state.items[position].clone())
    }

    fn has_value(&self) -> bool {
        self.position().is_some()
    }

    fn subscribe<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&T) + 'static,
        E: Fn() + 'static,
    {
        Disposable::composite(vec![
            self.channel.on_value.add(on_value),
            self.channel.on_empty.add(move |_| on_empty()),
        ])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
