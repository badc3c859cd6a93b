#![forbid(unsafe_code)]

//! Equality-suppressing nodes.
//!
//! The memory of the last emitted value lives in each subscription, not in the
//! node, so two subscribers of the same node never suppress each other's
//! notifications. The memory starts at the upstream value read when the
//! subscription is created.

use std::cell::RefCell;
use std::rc::Rc;

use crate::disposable::Disposable;
use crate::observable::ReadCell;
use crate::optional::ReadOptionalCell;

/// Passes upstream changes through unless they equal the last emitted value.
#[derive(Clone)]
pub struct Distinct<S> {
    source: S,
}

impl<S> Distinct<S> {
    pub(crate) fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S> ReadCell for Distinct<S>
where
    S: ReadCell,
    S::Value: PartialEq,
{
    type Value = S::Value;

    fn value(&self) -> S::Value {
        self.source.value()
    }

    fn subscribe<F>(&self, on_next: F) -> Disposable
    where
        F: Fn(&S::Value) + 'static,
    {
        let last = RefCell::new(self.source.value());
        self.source.subscribe(move |v| {
            {
                let mut last = last.borrow_mut();
                if *last == *v {
                    return;
                }
                *last = v.clone();
            }
            on_next(v);
        })
    }
}

/// Optional counterpart of [`Distinct`]: repeated values and repeated
/// "became empty" events are both suppressed.
#[derive(Clone)]
pub struct DistinctOptional<S> {
    source: S,
}

impl<S> DistinctOptional<S> {
    pub(crate) fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S> ReadOptionalCell for DistinctOptional<S>
where
    S: ReadOptionalCell,
    S::Value: PartialEq,
{
    type Value = S::Value;

    fn get(&self) -> Option<S::Value> {
        self.source.get()
    }

    fn has_value(&self) -> bool {
        self.source.has_value()
    }

    fn subscribe<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&S::Value) + 'static,
        E: Fn() + 'static,
    {
        let last = Rc::new(RefCell::new(self.source.get()));
        let last_for_empty = Rc::clone(&last);
        self.source.subscribe(
            move |v| {
                {
                    let mut last = last.borrow_mut();
                    if last.as_ref() == Some(v) {
                        return;
                    }
                    *last = Some(v.clone());
                }
                on_value(v);
            },
            move || {
                if last_for_empty.borrow_mut().take().is_none() {
                    return;
                }
                on_empty();
            },
        )
    }
}
