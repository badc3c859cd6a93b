#![forbid(unsafe_code)]

//! Flattening nodes: a cell whose value is itself a cell.
//!
//! These are the only stateful combinators. Each subscription owns a slot
//! holding the subscription to the currently selected inner cell. When the
//! outer cell changes, the slot's subscription is disposed, the new inner cell
//! is subscribed, and its current value is emitted.

use std::cell::RefCell;
use std::rc::Rc;

use crate::disposable::Disposable;
use crate::logging::trace;
use crate::observable::ReadCell;
use crate::optional::ReadOptionalCell;

type Slot = Rc<RefCell<Option<Disposable>>>;

fn release(slot: &Slot) {
    let current = slot.borrow_mut().take();
    drop(current);
}

/// Tracks the value of whichever inner cell the outer cell currently holds.
#[derive(Clone)]
pub struct Unfold<S> {
    source: S,
}

impl<S> Unfold<S> {
    pub(crate) fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S> ReadCell for Unfold<S>
where
    S: ReadCell,
    S::Value: ReadCell,
{
    type Value = <S::Value as ReadCell>::Value;

    fn value(&self) -> Self::Value {
        self.source.value().value()
    }

    fn subscribe<F>(&self, on_next: F) -> Disposable
    where
        F: Fn(&Self::Value) + 'static,
    {
        let on_next = Rc::new(on_next);
        let attach = {
            let on_next = Rc::clone(&on_next);
            move |inner: &S::Value| {
                let handler = Rc::clone(&on_next);
                inner.subscribe(move |v| handler(v))
            }
        };

        let slot: Slot = Rc::new(RefCell::new(None));
        *slot.borrow_mut() = Some(attach(&self.source.value()));

        let outer = {
            let slot = Rc::clone(&slot);
            self.source.subscribe(move |inner| {
                release(&slot);
                trace!("unfold switched inner cell");
                *slot.borrow_mut() = Some(attach(inner));
                on_next(&inner.value());
            })
        };

        Disposable::composite(vec![outer, Disposable::from_fn(move || release(&slot))])
    }
}

/// Tracks the state of whichever inner optional cell the outer cell currently
/// holds.
#[derive(Clone)]
pub struct UnfoldOptional<S> {
    source: S,
}

impl<S> UnfoldOptional<S> {
    pub(crate) fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S> ReadOptionalCell for UnfoldOptional<S>
where
    S: ReadCell,
    S::Value: ReadOptionalCell,
{
    type Value = <S::Value as ReadOptionalCell>::Value;

    fn get(&self) -> Option<Self::Value> {
        self.source.value().get()
    }

    fn subscribe<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&Self::Value) + 'static,
        E: Fn() + 'static,
    {
        let on_value = Rc::new(on_value);
        let on_empty = Rc::new(on_empty);
        let attach = {
            let (on_value, on_empty) = (Rc::clone(&on_value), Rc::clone(&on_empty));
            move |inner: &S::Value| {
                let (v, e) = (Rc::clone(&on_value), Rc::clone(&on_empty));
                inner.subscribe(move |value| v(value), move || e())
            }
        };

        let slot: Slot = Rc::new(RefCell::new(None));
        *slot.borrow_mut() = Some(attach(&self.source.value()));

        let outer = {
            let slot = Rc::clone(&slot);
            self.source.subscribe(move |inner| {
                release(&slot);
                trace!("unfold switched inner optional cell");
                *slot.borrow_mut() = Some(attach(inner));
                match inner.get() {
                    Some(value) => on_value(&value),
                    None => on_empty(),
                }
            })
        };

        Disposable::composite(vec![outer, Disposable::from_fn(move || release(&slot))])
    }
}

#[cfg(test)]
mod tests {
    use crate::combinator::CellExt;
    use crate::observable::{Observable, ReadCell};
    use crate::optional::{OptionalObservable, ReadOptionalCell};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn value_follows_selected_inner() {
        let left = Observable::new(1);
        let right = Observable::new(100);
        let selected = Observable::new(left.clone());
        let flat = selected.unfold();

        assert_eq!(flat.value(), 1);
        selected.set(right.clone());
        assert_eq!(flat.value(), 100);
        right.set(101);
        assert_eq!(flat.value(), 101);
    }

    #[test]
    fn resubscribes_on_switch() {
        let left = Observable::new(1);
        let right = Observable::new(100);
        let selected = Observable::new(left.clone());
        let flat = selected.unfold();

        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        let _sub = flat.subscribe(move |v: &i32| l.borrow_mut().push(*v));

        left.set(2);
        selected.set(right.clone());
        assert_eq!(left.subscriber_count(), 0);
        assert_eq!(right.subscriber_count(), 1);

        left.set(3);
        right.set(200);
        assert_eq!(*log.borrow(), vec![2, 100, 200]);
    }

    #[test]
    fn dispose_releases_inner_and_outer() {
        let inner = Observable::new(1);
        let selected = Observable::new(inner.clone());
        let flat = selected.unfold();
        let mut sub = flat.subscribe(|_| {});
        assert_eq!(inner.subscriber_count(), 1);
        assert_eq!(selected.subscriber_count(), 1);

        sub.dispose().unwrap();
        assert_eq!(inner.subscriber_count(), 0);
        assert_eq!(selected.subscriber_count(), 0);
    }

    #[test]
    fn unfold_through_map() {
        let a = Observable::new("a".to_string());
        let b = Observable::new("b".to_string());
        let use_b = Observable::new(false);
        let (a2, b2) = (a.clone(), b.clone());
        let flat = use_b
            .map(move |flag| if *flag { b2.clone() } else { a2.clone() })
            .unfold();

        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        let _sub = flat.subscribe(move |v: &String| l.borrow_mut().push(v.clone()));

        use_b.set(true);
        b.set("b2".to_string());
        a.set("a2".to_string());
        assert_eq!(*log.borrow(), vec!["b".to_string(), "b2".to_string()]);
    }

    #[test]
    fn unfold_optional_switches_channels() {
        let empty: OptionalObservable<i32> = OptionalObservable::new();
        let full = OptionalObservable::with_value(9);
        let selected = Observable::new(full.clone());
        let flat = selected.unfold_optional();
        assert_eq!(flat.get(), Some(9));

        let log = Rc::new(RefCell::new(Vec::new()));
        let (lv, le) = (Rc::clone(&log), Rc::clone(&log));
        let _sub = flat.subscribe(
            move |v: &i32| lv.borrow_mut().push(Some(*v)),
            move || le.borrow_mut().push(None),
        );

        selected.set(empty.clone());
        assert!(!flat.has_value());
        empty.set(4);
        full.set(10);
        selected.set(full.clone());
        assert_eq!(*log.borrow(), vec![None, Some(4), Some(10)]);
        assert_eq!(full.subscriber_count(), 2);
        assert_eq!(empty.subscriber_count(), 0);
    }
}
