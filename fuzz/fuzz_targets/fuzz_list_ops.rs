#![no_main]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rxcell_core::{Disposable, ListItem, ObservableList, ReadOptionalCell};

#[derive(Arbitrary, Debug)]
enum ListOp {
    Push(i16),
    Insert(u8, i16),
    Remove(u8),
    Set(u8, i16),
    Watch(u8),
    Clear,
    /// `clear()` whose first `item_removed` notification inserts at `u8`.
    ClearInserting(u8, i16),
    /// `clear()` whose first `item_removed` notification removes the front.
    ClearRemovingFront,
}

/// One edit made from inside an `item_removed` notification.
#[derive(Clone, Copy)]
enum Reentry {
    Insert(usize, i16),
    RemoveFront,
}

struct Watched {
    item: ListItem<i16>,
    empties: Rc<Cell<u32>>,
    _sub: Disposable,
}

fuzz_target!(|ops: Vec<ListOp>| {
    let list: ObservableList<i16> = ObservableList::new();
    let mut model: Vec<i16> = Vec::new();
    let mut watched: Vec<Watched> = Vec::new();

    // Listeners read the list while notifications are in flight.
    let reader = list.clone();
    let _added = list.item_added().add(move |&(p, v)| {
        assert_eq!(reader.get(p), Some(v));
    });
    let reader = list.clone();
    let _removed = list.item_removed().add(move |&(p, _)| {
        let _ = reader.len();
        let _ = reader.get(p);
    });
    let reader = list.clone();
    let _set = list.item_set().add(move |&(p, old, _)| {
        assert_eq!(reader.get(p), Some(old));
    });

    // Replays every event; must end up equal to the list after each op.
    let shadow: Rc<RefCell<Vec<i16>>> = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&shadow);
    let _shadow_added = list.item_added().add(move |&(p, v)| s.borrow_mut().insert(p, v));
    let s = Rc::clone(&shadow);
    let _shadow_removed = list.item_removed().add(move |&(p, v)| {
        assert_eq!(s.borrow_mut().remove(p), v);
    });
    let s = Rc::clone(&shadow);
    let _shadow_set = list.item_set().add(move |&(p, old, new)| {
        let mut shadow = s.borrow_mut();
        assert_eq!(std::mem::replace(&mut shadow[p], new), old);
    });

    // Mutates the list from inside its own notification, once per arming.
    let pending: Rc<Cell<Option<Reentry>>> = Rc::new(Cell::new(None));
    let writer = list.clone();
    let p = Rc::clone(&pending);
    let _reentry = list.item_removed().add(move |_| match p.take() {
        Some(Reentry::Insert(i, v)) => {
            let _ = writer.insert(i, v);
        }
        Some(Reentry::RemoveFront) => {
            let _ = writer.remove_at(0);
        }
        None => {}
    });

    for op in ops.into_iter().take(256) {
        let len = model.len();
        match op {
            ListOp::Push(v) => {
                list.push(v);
                model.push(v);
            }
            ListOp::Insert(i, v) => {
                let i = usize::from(i);
                let ok = list.insert(i, v).is_ok();
                assert_eq!(ok, i <= len);
                if ok {
                    model.insert(i, v);
                }
            }
            ListOp::Remove(i) => {
                let i = usize::from(i);
                match list.remove_at(i) {
                    Ok(v) => assert_eq!(v, model.remove(i)),
                    Err(_) => assert!(i >= len),
                }
            }
            ListOp::Set(i, v) => {
                let i = usize::from(i);
                match list.set(i, v) {
                    Ok(old) => assert_eq!(old, std::mem::replace(&mut model[i], v)),
                    Err(_) => assert!(i >= len),
                }
            }
            ListOp::Watch(i) => {
                if let Ok(item) = list.get_observable(usize::from(i)) {
                    let empties = Rc::new(Cell::new(0u32));
                    let e = Rc::clone(&empties);
                    let last = Rc::new(RefCell::new(None));
                    let l = Rc::clone(&last);
                    let sub = item.subscribe(
                        move |v: &i16| *l.borrow_mut() = Some(*v),
                        move || e.set(e.get() + 1),
                    );
                    watched.push(Watched {
                        item,
                        empties,
                        _sub: sub,
                    });
                }
            }
            ListOp::Clear => {
                list.clear();
                model.clear();
            }
            ListOp::ClearInserting(i, v) => {
                pending.set(Some(Reentry::Insert(usize::from(i), v)));
                list.clear();
                pending.set(None);
                model.clear();
            }
            ListOp::ClearRemovingFront => {
                pending.set(Some(Reentry::RemoveFront));
                list.clear();
                pending.set(None);
                model.clear();
            }
        }

        assert_eq!(list.to_vec(), model);
        assert_eq!(*shadow.borrow(), model);
        for w in &watched {
            match w.item.position() {
                Some(p) => {
                    assert_eq!(w.item.get(), Some(model[p]));
                    assert_eq!(w.empties.get(), 0);
                }
                None => {
                    assert!(!w.item.has_value());
                    assert_eq!(w.empties.get(), 1);
                }
            }
        }
    }
});
