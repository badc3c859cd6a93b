#![forbid(unsafe_code)]

//! Two-source nodes.
//!
//! The plain [`CombineLatest`] listens to its **first** source only: a change
//! to the second source is picked up the next time the first one changes, or
//! on the next read. [`CombineLatestOptional`] and [`Bind`] listen to both
//! sides. Callers that need symmetric reactivity over two plain cells should
//! reach for `combine_latest_optional` on an optional second source.
//!
//! Every node reads the other side's latest value at the moment it combines;
//! nothing is cached.

use std::rc::Rc;

use crate::disposable::Disposable;
use crate::observable::ReadCell;
use crate::optional::ReadOptionalCell;

/// `f(a, b)`, notified by changes of `a` only.
pub struct CombineLatest<A, B, F> {
    a: A,
    b: B,
    f: Rc<F>,
}

impl<A, B, F> CombineLatest<A, B, F> {
    pub(crate) fn new(a: A, b: B, f: F) -> Self {
        Self { a, b, f: Rc::new(f) }
    }
}

impl<A: Clone, B: Clone, F> Clone for CombineLatest<A, B, F> {
    fn clone(&self) -> Self {
        Self {
            a: self.a.clone(),
            b: self.b.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<A, B, F, U> ReadCell for CombineLatest<A, B, F>
where
    A: ReadCell,
    B: ReadCell,
    F: Fn(&A::Value, &B::Value) -> U + 'static,
    U: Clone + 'static,
{
    type Value = U;

    fn value(&self) -> U {
        (self.f)(&self.a.value(), &self.b.value())
    }

    fn subscribe<G>(&self, on_next: G) -> Disposable
    where
        G: Fn(&U) + 'static,
    {
        let b = self.b.clone();
        let f = Rc::clone(&self.f);
        self.a.subscribe(move |av| on_next(&f(av, &b.value())))
    }
}

/// `f(a, b)` while `b` holds a value, empty otherwise. Reacts to both sides.
pub struct CombineLatestOptional<A, B, F> {
    a: A,
    b: B,
    f: Rc<F>,
}

impl<A, B, F> CombineLatestOptional<A, B, F> {
    pub(crate) fn new(a: A, b: B, f: F) -> Self {
        Self { a, b, f: Rc::new(f) }
    }
}

impl<A: Clone, B: Clone, F> Clone for CombineLatestOptional<A, B, F> {
    fn clone(&self) -> Self {
        Self {
            a: self.a.clone(),
            b: self.b.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<A, B, F, U> ReadOptionalCell for CombineLatestOptional<A, B, F>
where
    A: ReadCell,
    B: ReadOptionalCell,
    F: Fn(&A::Value, &B::Value) -> U + 'static,
    U: Clone + 'static,
{
    type Value = U;

    fn get(&self) -> Option<U> {
        self.b.get().map(|bv| (self.f)(&self.a.value(), &bv))
    }

    fn has_value(&self) -> bool {
        self.b.has_value()
    }

    fn subscribe<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&U) + 'static,
        E: Fn() + 'static,
    {
        let on_value = Rc::new(on_value);
        let on_empty = Rc::new(on_empty);

        let from_a = {
            let b = self.b.clone();
            let f = Rc::clone(&self.f);
            let (on_value, on_empty) = (Rc::clone(&on_value), Rc::clone(&on_empty));
            self.a.subscribe(move |av| match b.get() {
                Some(bv) => on_value(&f(av, &bv)),
                None => on_empty(),
            })
        };

        let from_b = {
            let a = self.a.clone();
            let f = Rc::clone(&self.f);
            self.b
                .subscribe(move |bv| on_value(&f(&a.value(), bv)), move || on_empty())
        };

        Disposable::composite(vec![from_a, from_b])
    }
}

/// Dual optional bind: `f(a, b)` while both sides hold values, empty
/// otherwise. Reacts to both sides.
pub struct Bind<A, B, F> {
    a: A,
    b: B,
    f: Rc<F>,
}

impl<A, B, F> Bind<A, B, F> {
    pub(crate) fn new(a: A, b: B, f: F) -> Self {
        Self { a, b, f: Rc::new(f) }
    }
}

impl<A: Clone, B: Clone, F> Clone for Bind<A, B, F> {
    fn clone(&self) -> Self {
        Self {
            a: self.a.clone(),
            b: self.b.clone(),
            f: Rc::clone(&self.f),
        }
    }
}

impl<A, B, F, U> ReadOptionalCell for Bind<A, B, F>
where
    A: ReadOptionalCell,
    B: ReadOptionalCell,
    F: Fn(&A::Value, &B::Value) -> U + 'static,
    U: Clone + 'static,
{
    type Value = U;

    fn get(&self) -> Option<U> {
        let av = self.a.get()?;
        let bv = self.b.get()?;
        Some((self.f)(&av, &bv))
    }

    fn has_value(&self) -> bool {
        self.a.has_value() && self.b.has_value()
    }

    fn subscribe<V, E>(&self, on_value: V, on_empty: E) -> Disposable
    where
        V: Fn(&U) + 'static,
        E: Fn() + 'static,
    {
        let on_value = Rc::new(on_value);
        let on_empty = Rc::new(on_empty);

        let from_a = {
            let b = self.b.clone();
            let f = Rc::clone(&self.f);
            let (on_value, on_empty) = (Rc::clone(&on_value), Rc::clone(&on_empty));
            let empty = Rc::clone(&on_empty);
            self.a.subscribe(
                move |av| match b.get() {
                    Some(bv) => on_value(&f(av, &bv)),
                    None => on_empty(),
                },
                move || empty(),
            )
        };

        let from_b = {
            let a = self.a.clone();
            let f = Rc::clone(&self.f);
            let empty = Rc::clone(&on_empty);
            self.b.subscribe(
                move |bv| match a.get() {
                    Some(av) => on_value(&f(&av, bv)),
                    None => on_empty(),
                },
                move || empty(),
            )
        };

        Disposable::composite(vec![from_a, from_b])
    }
}

#[cfg(test)]
mod tests {
    use crate::combinator::{CellExt, OptionalCellExt};
    use crate::observable::{Observable, ReadCell};
    use crate::optional::{OptionalObservable, ReadOptionalCell};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&String) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        (log, move |v: &String| l.borrow_mut().push(v.clone()))
    }

    #[test]
    fn combine_latest_reads_both() {
        let width = Observable::new(10);
        let height = Observable::new(20);
        let area = width.combine_latest(&height, |w, h| w * h);
        assert_eq!(area.value(), 200);
        height.set(30);
        assert_eq!(area.value(), 300);
    }

    #[test]
    fn combine_latest_notifies_on_first_source_only() {
        let first = Observable::new("John".to_string());
        let last = Observable::new("Doe".to_string());
        let full = first.combine_latest(&last, |f, l| format!("{f} {l}"));
        let (log, record) = recorder();
        let _sub = full.subscribe(record);

        last.set("Smith".to_string());
        assert!(log.borrow().is_empty());
        assert_eq!(last.subscriber_count(), 0);

        first.set("Jane".to_string());
        assert_eq!(*log.borrow(), vec!["Jane Smith".to_string()]);
    }

    #[test]
    fn combine_latest_optional_follows_both_sides() {
        let a = Observable::new(100);
        let b: OptionalObservable<String> = OptionalObservable::new();
        let combined = a.combine_latest_optional(&b, |n, s| format!("{n}:{s}"));
        assert_eq!(combined.get(), None);

        let log = Rc::new(RefCell::new(Vec::new()));
        let (lv, le) = (Rc::clone(&log), Rc::clone(&log));
        let _sub = combined.subscribe(
            move |v: &String| lv.borrow_mut().push(v.clone()),
            move || le.borrow_mut().push("empty".to_string()),
        );

        b.set("apple".to_string());
        assert_eq!(combined.get(), Some("100:apple".to_string()));
        a.set(5);
        assert_eq!(combined.get(), Some("5:apple".to_string()));
        b.clear();
        a.set(6);
        assert_eq!(
            *log.borrow(),
            vec!["100:apple", "5:apple", "empty", "empty"]
        );
    }

    #[test]
    fn combine_latest_optional_disposal_detaches_both() {
        let a = Observable::new(1);
        let b = OptionalObservable::with_value(2);
        let combined = a.combine_latest_optional(&b, |x, y| x + y);
        let mut sub = combined.subscribe(|_| {}, || {});
        assert_eq!(a.subscriber_count(), 1);
        assert_eq!(b.subscriber_count(), 2);
        sub.dispose().unwrap();
        assert_eq!(a.subscriber_count(), 0);
        assert_eq!(b.subscriber_count(), 0);
    }

    #[test]
    fn bind_requires_both_values() {
        let a = OptionalObservable::with_value(2);
        let b: OptionalObservable<i32> = OptionalObservable::new();
        let product = a.bind(&b, |x, y| x * y);
        assert!(!product.has_value());

        let log = Rc::new(RefCell::new(Vec::new()));
        let (lv, le) = (Rc::clone(&log), Rc::clone(&log));
        let _sub = product.subscribe(
            move |v: &i32| lv.borrow_mut().push(Some(*v)),
            move || le.borrow_mut().push(None),
        );

        b.set(3);
        a.set(4);
        a.clear();
        b.set(5);
        assert_eq!(*log.borrow(), vec![Some(6), Some(12), None, None]);
        assert_eq!(product.get(), None);
    }
}
