#![forbid(unsafe_code)]

//! Projection nodes.

use std::rc::Rc;

use crate::disposable::Disposable;
use crate::observable::ReadCell;
use crate::optional::ReadOptionalCell;

/// `f(source)`, recomputed on every read and on every upstream change.
pub struct Map<S, F> {
    source: S,
    f: Rc<F>,
}

impl<S, F> Map<S, F> {
    pub(crate) fn new(source: S, f: F) -> Self {
        Self {
            source,
            f: Rc::new(f),
        }
    }
}

impl<S: Clone, F> Clone for Map<S, F> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<S, F, U> ReadCell for Map<S, F>
where
    S: ReadCell,
    F: Fn(&S::Value) -> U + 'static,
    U: Clone + 'static,
{
    type Value = U;

    fn value(&self) -> U {
        (self.f)(&self.source.value())
    }

    fn subscribe<G>(&self, on_next: G) -> Disposable
    where
        G: Fn(&U) + 'static,
    {
        let f = Rc::clone(&self.f);
        self.source.subscribe(move |v| on_next(&f(v)))
    }
}

/// Single-source bind over an optional cell: empty while the source is
/// empty, `f(value)` otherwise.
pub struct MapOptional<S, F> {
    source: S,
    f: Rc<F>,
}

impl<S, F> MapOptional<S, F> {
    pub(crate) fn new(source: S, f: F) -> Self {
        Self {
            source,
            f: Rc::new(f),
        }
    }
}

impl<S: Clone, F> Clone for MapOptional<S, F> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<S, F, U> ReadOptionalCell for MapOptional<S, F>
where
    S: ReadOptionalCell,
    F: Fn(&S::Value) -> U + 'static,
    U: Clone + 'static,
{
    type Value = U;

    fn get(&self) -> Option<U> {
        self.source.get().map(|v| (self.f)(&v))
    }

    fn has_value(&self) -> bool {
        self.source.has_value()
    }

    fn subscribe<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&U) + 'static,
        E: Fn() + 'static,
    {
        let f = Rc::clone(&self.f);
        self.source.subscribe(move |v| on_value(&f(v)), on_empty)
    }
}
