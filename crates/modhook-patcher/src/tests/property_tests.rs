//! Property-based tests for arbitrary patch/unpatch interleavings.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;

use super::{current, log, target};
use crate::{Patcher, Unpatch};

#[derive(Debug, Clone)]
enum Op {
    Before,
    After,
    Instead,
    Unpatch(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Before),
        Just(Op::After),
        Just(Op::Instead),
        (0usize..16).prop_map(Op::Unpatch),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every live hook runs exactly once per call, and the original comes
    /// back as soon as no hook is live.
    #[test]
    fn prop_live_hooks_run_and_original_returns(ops in prop::collection::vec(op_strategy(), 1..24)) {
        let calls = log();
        let (object, original) = target(&calls);
        let patcher = Patcher::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let mut handles: Vec<Unpatch> = Vec::new();

        for op in ops {
            match op {
                Op::Before => {
                    let runs = runs.clone();
                    handles.push(patcher.before(&object, "run", move |_| {
                        runs.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }).unwrap());
                }
                Op::After => {
                    let runs = runs.clone();
                    handles.push(patcher.after(&object, "run", move |_, _| {
                        runs.fetch_add(1, Ordering::SeqCst);
                        Ok(None)
                    }).unwrap());
                }
                Op::Instead => {
                    let runs = runs.clone();
                    handles.push(patcher.instead(&object, "run", move |args, next| {
                        runs.fetch_add(1, Ordering::SeqCst);
                        next.call(args)
                    }).unwrap());
                }
                Op::Unpatch(i) => {
                    if let Some(handle) = handles.get(i) {
                        handle.unpatch();
                    }
                }
            }

            let live = handles.iter().filter(|h| h.is_active()).count();
            runs.store(0, Ordering::SeqCst);
            calls.lock().clear();
            object.call_method("run", &[]).unwrap();

            prop_assert_eq!(runs.load(Ordering::SeqCst), live);
            prop_assert_eq!(calls.lock().len(), 1);
            prop_assert_eq!(current(&object).ptr_eq(&original), live == 0);
        }

        for handle in &handles {
            handle.unpatch();
        }
        prop_assert!(current(&object).ptr_eq(&original));
        prop_assert_eq!(patcher.patched_slots(), 0);
    }
}
