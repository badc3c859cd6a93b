#![forbid(unsafe_code)]

//! rxcell public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub use rxcell_core::*;

pub mod prelude {
    pub use rxcell_core as core;
    pub use rxcell_core::{
        AfterDispose, CellExt, Disposable, ListConfig, ListItem, Observable, ObservableList,
        OptionalCellExt, OptionalObservable, ReactiveError, ReadCell, ReadOptionalCell,
        ScopeConfig, Signal, StableId, SubscriptionHandle, Subscriptions,
    };
}
