#![forbid(unsafe_code)]

//! Composable derivation operators.
//!
//! Every operator returns a new node that implements [`ReadCell`] or
//! [`ReadOptionalCell`] itself, so operators chain indefinitely:
//!
//! ```
//! use rxcell_core::combinator::{CellExt, OptionalCellExt};
//! use rxcell_core::{Observable, ReadOptionalCell};
//!
//! let count = Observable::new(3);
//! let label = count
//!     .where_or_none(|n| *n > 0)
//!     .map(|n| format!("{n} items"));
//! assert_eq!(label.get(), Some("3 items".to_string()));
//!
//! count.set(0);
//! assert!(!label.has_value());
//! ```
//!
//! # Ownership
//!
//! A node holds handles to its sources and nothing else. It has no storage of
//! its own: reads recompute from the sources, and subscribing attaches one
//! listener per source. Disposing the returned [`Disposable`](crate::Disposable)
//! detaches all of them. A node never disposes anything upstream, and nothing
//! upstream holds the node, so chains cannot form reference cycles.
//!
//! The only nodes with per-subscription state are the `distinct_until_changed`
//! family (last emitted value) and the `unfold` family (current inner
//! subscription).

pub mod combine;
pub mod distinct;
pub mod filter;
pub mod map;
pub mod unfold;

pub use combine::{Bind, CombineLatest, CombineLatestOptional};
pub use distinct::{Distinct, DistinctOptional};
pub use filter::{FilterMap, WhereOrNone};
pub use map::{Map, MapOptional};
pub use unfold::{Unfold, UnfoldOptional};

use crate::observable::ReadCell;
use crate::optional::ReadOptionalCell;

/// Operators available on every [`ReadCell`].
pub trait CellExt: ReadCell + Sized {
    /// `f(value)`. Notifies exactly when this cell notifies.
    fn map<U, F>(&self, f: F) -> Map<Self, F>
    where
        F: Fn(&Self::Value) -> U + 'static,
        U: Clone + 'static,
    {
        Map::new(self.clone(), f)
    }

    /// Alias of [`map`](Self::map).
    fn select<U, F>(&self, f: F) -> Map<Self, F>
    where
        F: Fn(&Self::Value) -> U + 'static,
        U: Clone + 'static,
    {
        self.map(f)
    }

    /// Holds the value while `predicate` accepts it, empty otherwise.
    fn where_or_none<P>(&self, predicate: P) -> WhereOrNone<Self, P>
    where
        P: Fn(&Self::Value) -> bool + 'static,
    {
        WhereOrNone::new(self.clone(), predicate)
    }

    /// Holds `try_get(value)` when it returns `Some`, empty otherwise.
    fn filter_map<U, F>(&self, try_get: F) -> FilterMap<Self, F>
    where
        F: Fn(&Self::Value) -> Option<U> + 'static,
        U: Clone + 'static,
    {
        FilterMap::new(self.clone(), try_get)
    }

    /// Alias of [`filter_map`](Self::filter_map).
    fn where_select<U, F>(&self, try_get: F) -> FilterMap<Self, F>
    where
        F: Fn(&Self::Value) -> Option<U> + 'static,
        U: Clone + 'static,
    {
        self.filter_map(try_get)
    }

    /// `f(self, other)`, notified by changes of `self` only. `other` is read
    /// at notification time.
    fn combine_latest<B, U, F>(&self, other: &B, f: F) -> CombineLatest<Self, B, F>
    where
        B: ReadCell,
        F: Fn(&Self::Value, &B::Value) -> U + 'static,
        U: Clone + 'static,
    {
        CombineLatest::new(self.clone(), other.clone(), f)
    }

    /// `f(self, other)` while `other` holds a value, empty otherwise.
    /// Notified by changes of either side.
    fn combine_latest_optional<B, U, F>(
        &self,
        other: &B,
        f: F,
    ) -> CombineLatestOptional<Self, B, F>
    where
        B: ReadOptionalCell,
        F: Fn(&Self::Value, &B::Value) -> U + 'static,
        U: Clone + 'static,
    {
        CombineLatestOptional::new(self.clone(), other.clone(), f)
    }

    /// Suppresses notifications equal to the last one delivered.
    fn distinct_until_changed(&self) -> Distinct<Self>
    where
        Self::Value: PartialEq,
    {
        Distinct::new(self.clone())
    }

    /// Flattens a cell of cells into the currently selected inner cell.
    fn unfold(&self) -> Unfold<Self>
    where
        Self::Value: ReadCell,
    {
        Unfold::new(self.clone())
    }

    /// Flattens a cell of optional cells into the currently selected one.
    fn unfold_optional(&self) -> UnfoldOptional<Self>
    where
        Self::Value: ReadOptionalCell,
    {
        UnfoldOptional::new(self.clone())
    }
}

impl<C: ReadCell> CellExt for C {}

/// Operators available on every [`ReadOptionalCell`].
pub trait OptionalCellExt: ReadOptionalCell + Sized {
    /// Single-source bind: `f(value)` while this cell holds a value.
    fn map<U, F>(&self, f: F) -> MapOptional<Self, F>
    where
        F: Fn(&Self::Value) -> U + 'static,
        U: Clone + 'static,
    {
        MapOptional::new(self.clone(), f)
    }

    /// Dual-source bind: `f(self, other)` while both hold values.
    fn bind<B, U, F>(&self, other: &B, f: F) -> Bind<Self, B, F>
    where
        B: ReadOptionalCell,
        F: Fn(&Self::Value, &B::Value) -> U + 'static,
        U: Clone + 'static,
    {
        Bind::new(self.clone(), other.clone(), f)
    }

    /// Suppresses repeated values and repeated empties.
    fn distinct_until_changed(&self) -> DistinctOptional<Self>
    where
        Self::Value: PartialEq,
    {
        DistinctOptional::new(self.clone())
    }
}

impl<C: ReadOptionalCell> OptionalCellExt for C {}
