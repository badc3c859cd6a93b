#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rxcell_core::{
    AfterDispose, CellExt, Disposable, Observable, ReadCell, ScopeConfig, SubscriptionHandle,
    Subscriptions,
};

#[derive(Arbitrary, Debug)]
enum ScopeOp {
    AddCounter,
    AddDerived,
    /// Registers a disposable that adds a fresh entry to the scope when run.
    AddReentrant,
    Remove(u8),
    Take(u8),
    Write(u32),
    Dispose,
}

fuzz_target!(|input: (bool, Vec<ScopeOp>)| {
    let (reject, ops) = input;
    let policy = if reject {
        AfterDispose::Reject
    } else {
        AfterDispose::DisposeImmediately
    };
    let scope = Subscriptions::with_config(ScopeConfig::default().with_after_dispose(policy));
    let source = Observable::new(0u32);
    let runs: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
    let mut handles: Vec<SubscriptionHandle> = Vec::new();
    let mut tag = 0u64;

    for op in ops.into_iter().take(256) {
        tag += 1;
        let log = Rc::clone(&runs);
        let id = tag;
        match op {
            ScopeOp::AddCounter => {
                if let Ok(h) = scope.add(Disposable::from_fn(move || log.borrow_mut().push(id))) {
                    handles.push(h);
                }
            }
            ScopeOp::AddDerived => {
                let derived = source.map(|v| v.wrapping_mul(3));
                if let Ok(h) = scope.add(derived.subscribe(|_| {})) {
                    handles.push(h);
                }
            }
            ScopeOp::AddReentrant => {
                let inner = scope.clone();
                let d = Disposable::from_fn(move || {
                    log.borrow_mut().push(id);
                    let _ = inner.add(Disposable::from_fn(|| {}));
                });
                if let Ok(h) = scope.add(d) {
                    handles.push(h);
                }
            }
            ScopeOp::Remove(i) => {
                if !handles.is_empty() {
                    let h = handles.swap_remove(usize::from(i) % handles.len());
                    let _ = scope.remove(h);
                }
            }
            ScopeOp::Take(i) => {
                if !handles.is_empty() {
                    let h = handles.swap_remove(usize::from(i) % handles.len());
                    drop(scope.take(h));
                }
            }
            ScopeOp::Write(v) => source.set(v),
            ScopeOp::Dispose => {
                scope.dispose();
                assert!(scope.is_empty());
            }
        }

        let mut seen = runs.borrow().clone();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), total, "disposable ran twice");
    }
});
