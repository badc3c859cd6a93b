#![forbid(unsafe_code)]

//! Reactive state propagation primitives for rxcell.
//!
//! This crate provides the building blocks that drive presentation from
//! mutable application state:
//!
//! - [`Signal`]: a multicast callback register, the notification primitive
//!   everything else is built on.
//! - [`Observable`]: a mutable value that notifies on every write.
//! - [`OptionalObservable`]: a value cell with an explicit empty state that
//!   suppresses equal writes.
//! - [`combinator`]: derived read-only nodes (`map`, `where_or_none`,
//!   `filter_map`, `combine_latest`, `combine_latest_optional`,
//!   `distinct_until_changed`, `unfold`) that chain indefinitely.
//! - [`ObservableList`]: an index-addressable sequence whose per-element
//!   observables survive inserts and removes elsewhere in the list.
//! - [`Subscriptions`]: a composite-disposal scope.
//!
//! # Architecture
//!
//! Everything is single-threaded and synchronous. Handles share state through
//! `Rc<RefCell<..>>`; a write drives every dependent notification to
//! completion before it returns. No borrow is held while callbacks run, so
//! subscribers may re-enter and mutate the cell that is notifying them.
//!
//! # Invariants
//!
//! 1. A notification pass delivers to the registrants captured when the pass
//!    started, in registration order.
//! 2. Derived nodes have no storage; reads are never stale.
//! 3. Every registration returns a [`Disposable`]. Disposing it twice fails
//!    with [`ReactiveError::AlreadyDisposed`].
//! 4. A list element's stable id, once removed, never maps to a position
//!    again.

pub mod combinator;
pub mod config;
pub mod disposable;
pub mod error;
pub mod list;
mod logging;
pub mod observable;
pub mod optional;
pub mod scope;
pub mod signal;

pub use combinator::{CellExt, OptionalCellExt};
pub use config::{AfterDispose, ListConfig, ScopeConfig};
pub use disposable::Disposable;
pub use error::{ReactiveError, Result};
pub use list::{ListItem, ObservableList, StableId};
pub use observable::{Observable, ReadCell};
pub use optional::{OptionalObservable, ReadOptionalCell};
pub use scope::{SubscriptionHandle, Subscriptions};
pub use signal::{Callback, Signal};
