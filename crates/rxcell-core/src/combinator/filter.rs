#![forbid(unsafe_code)]

//! Filtering nodes that turn a plain cell into an optional one.
//!
//! Both nodes re-evaluate on every upstream change and emit on every upstream
//! change, not only when the predicate flips.

use std::rc::Rc;

use crate::disposable::Disposable;
use crate::observable::ReadCell;
use crate::optional::ReadOptionalCell;

/// `Some(v)` while `predicate(v)` holds, empty otherwise.
pub struct WhereOrNone<S, P> {
    source: S,
    predicate: Rc<P>,
}

impl<S, P> WhereOrNone<S, P> {
    pub(crate) fn new(source: S, predicate: P) -> Self {
        Self {
            source,
            predicate: Rc::new(predicate),
        }
    }
}

impl<S: Clone, P> Clone for WhereOrNone<S, P> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            predicate: Rc::clone(&self.predicate),
        }
    }
}

impl<S, P> ReadOptionalCell for WhereOrNone<S, P>
where
    S: ReadCell,
    P: Fn(&S::Value) -> bool + 'static,
{
    type Value = S::Value;

    fn get(&self) -> Option<S::Value> {
        let value = self.source.value();
        (self.predicate)(&value).then_some(value)
    }

    fn subscribe<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&S::Value) + 'static,
        E: Fn() + 'static,
    {
        let predicate = Rc::clone(&self.predicate);
        self.source.subscribe(move |v| {
            if predicate(v) {
                on_value(v);
            } else {
                on_empty();
            }
        })
    }
}

/// Combined predicate and projection: `try_get(v)` decides both whether the
/// node holds a value and what that value is.
pub struct FilterMap<S, F> {
    source: S,
    try_get: Rc<F>,
}

impl<S, F> FilterMap<S, F> {
    pub(crate) fn new(source: S, try_get: F) -> Self {
        Self {
            source,
            try_get: Rc::new(try_get),
        }
    }
}

impl<S: Clone, F> Clone for FilterMap<S, F> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            try_get: Rc::clone(&self.try_get),
        }
    }
}

impl<S, F, U> ReadOptionalCell for FilterMap<S, F>
where
    S: ReadCell,
    F: Fn(&S::Value) -> Option<U> + 'static,
    U: Clone + 'static,
{
    type Value = U;

    fn get(&self) -> Option<U> {
        (self.try_get)(&self.source.value())
    }

    fn subscribe<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&U) + 'static,
        E: Fn() + 'static,
    {
        let try_get = Rc::clone(&self.try_get);
        self.source.subscribe(move |v| match try_get(v) {
            Some(projected) => on_value(&projected),
            None => on_empty(),
        })
    }
}
