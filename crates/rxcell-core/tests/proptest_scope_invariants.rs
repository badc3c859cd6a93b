//! Property-based invariant tests for `Subscriptions` bookkeeping.
//!
//! Arbitrary add / remove / take / dispose sequences are applied to a scope
//! and to a `BTreeMap` model. Every added disposable records its tag in a
//! shared log when it runs, which lets the tests verify:
//!
//! 1. Handles are valid, unique, and strictly increasing.
//! 2. No disposable runs more than once.
//! 3. `remove` excises an entry without running it.
//! 4. `dispose` runs exactly the live entries, in handle order.
//! 5. After `dispose`, adds run immediately (default policy) or are refused
//!    and still run on drop (`AfterDispose::Reject`).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use proptest::prelude::*;
use rxcell_core::{
    AfterDispose, Disposable, ReactiveError, ScopeConfig, SubscriptionHandle, Subscriptions,
};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Add,
    /// Remove the n-th live entry (modulo the live count).
    Remove(usize),
    /// Take the n-th live entry and drop it.
    Take(usize),
    Dispose,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => Just(Op::Add),
        2 => any::<usize>().prop_map(Op::Remove),
        2 => any::<usize>().prop_map(Op::Take),
        1 => Just(Op::Dispose),
    ]
}

fn policy() -> impl Strategy<Value = AfterDispose> {
    prop_oneof![Just(AfterDispose::DisposeImmediately), Just(AfterDispose::Reject)]
}

// ── Helpers ─────────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<u32>>>;

fn tracked(log: &Log, tag: u32) -> Disposable {
    let log = Rc::clone(log);
    Disposable::from_fn(move || log.borrow_mut().push(tag))
}

fn nth_live(model: &BTreeMap<SubscriptionHandle, u32>, n: usize) -> Option<SubscriptionHandle> {
    if model.is_empty() {
        return None;
    }
    model.keys().nth(n % model.len()).copied()
}

// ═════════════════════════════════════════════════════════════════════════
// 1-5. Scope bookkeeping follows the model
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scope_matches_model(
        ops in proptest::collection::vec(op(), 1..60),
        after_dispose in policy(),
    ) {
        let scope = Subscriptions::with_config(ScopeConfig::default().with_after_dispose(after_dispose));
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut model: BTreeMap<SubscriptionHandle, u32> = BTreeMap::new();
        let mut expected_log: Vec<u32> = Vec::new();
        let mut last_handle = SubscriptionHandle::INVALID;
        let mut disposed = false;
        let mut next_tag = 0u32;

        for op in &ops {
            match *op {
                Op::Add => {
                    next_tag += 1;
                    let result = scope.add(tracked(&log, next_tag));
                    if !disposed {
                        let handle = result.unwrap();
                        prop_assert!(handle.is_valid());
                        prop_assert!(handle > last_handle);
                        last_handle = handle;
                        model.insert(handle, next_tag);
                    } else {
                        match after_dispose {
                            AfterDispose::DisposeImmediately => {
                                prop_assert_eq!(result, Ok(SubscriptionHandle::INVALID));
                            }
                            AfterDispose::Reject => {
                                prop_assert_eq!(result, Err(ReactiveError::ScopeDisposed));
                            }
                        }
                        expected_log.push(next_tag);
                    }
                }
                Op::Remove(n) => {
                    if let Some(handle) = nth_live(&model, n) {
                        prop_assert!(scope.remove(handle));
                        model.remove(&handle);
                    }
                    prop_assert!(!scope.remove(SubscriptionHandle::INVALID));
                }
                Op::Take(n) => {
                    if let Some(handle) = nth_live(&model, n) {
                        let taken = scope.take(handle);
                        prop_assert!(taken.is_some());
                        drop(taken);
                        expected_log.push(model.remove(&handle).unwrap());
                    }
                }
                Op::Dispose => {
                    scope.dispose();
                    disposed = true;
                    expected_log.extend(std::mem::take(&mut model).into_values());
                }
            }

            prop_assert_eq!(&*log.borrow(), &expected_log);
            prop_assert_eq!(scope.len(), model.len());
            prop_assert_eq!(scope.is_disposed(), disposed);
            for handle in model.keys() {
                prop_assert!(scope.contains(*handle));
            }
        }

        let mut seen = log.borrow().clone();
        seen.sort_unstable();
        let before = seen.len();
        seen.dedup();
        prop_assert_eq!(seen.len(), before, "a disposable ran twice");
    }

    /// Nested scopes unwind exactly once regardless of which level is
    /// disposed first.
    #[test]
    fn nested_scopes_unwind_once(inner_first in any::<bool>(), entries in 1usize..8) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let outer = Subscriptions::new();
        let inner = Subscriptions::new();
        for tag in 0..entries {
            inner.add(tracked(&log, tag as u32)).unwrap();
        }
        outer.add(inner.clone().into()).unwrap();

        if inner_first {
            inner.dispose();
        }
        outer.dispose();
        inner.dispose();

        let expected: Vec<u32> = (0..entries as u32).collect();
        prop_assert_eq!(&*log.borrow(), &expected);
        prop_assert!(inner.is_disposed());
        prop_assert!(outer.is_empty());
    }
}
