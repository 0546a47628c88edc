use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use modhook_value::{CallError, CallResult, Object, Value};
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;

use crate::error::{PatchError, Result};
use crate::state::{Hook, HookKind, Next, PatchState};

/// `(object address, property key)`.
type SlotKey = (usize, Arc<str>);

/// Installs and tracks hooks on object method slots.
///
/// Cloning is cheap and shares the set of patched slots.
#[derive(Clone, Default)]
pub struct Patcher {
    inner: Arc<PatcherInner>,
}

#[derive(Default)]
struct PatcherInner {
    states: Mutex<HashMap<SlotKey, Arc<PatchState>>>,
}

impl PatcherInner {
    /// Drop `state` if it has no hooks left, restoring the original function.
    fn release(&self, state: &Arc<PatchState>) {
        let mut states = self.states.lock();
        if !state.is_empty() {
            return;
        }
        state.restore();
        states.retain(|_, tracked| !Arc::ptr_eq(tracked, state));
    }
}

impl Patcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` before `object[key]`. The hook may rewrite the arguments.
    pub fn before<F>(&self, object: &Object, key: &str, hook: F) -> Result<Unpatch>
    where
        F: Fn(&mut Vec<Value>) -> std::result::Result<(), CallError> + Send + Sync + 'static,
    {
        self.patch(object, key, Hook::Before(Arc::new(hook)))
    }

    /// Run `hook` after `object[key]` returns successfully. Returning
    /// `Some(value)` replaces the result seen by the caller.
    pub fn after<F>(&self, object: &Object, key: &str, hook: F) -> Result<Unpatch>
    where
        F: Fn(&[Value], &Value) -> std::result::Result<Option<Value>, CallError>
            + Send
            + Sync
            + 'static,
    {
        self.patch(object, key, Hook::After(Arc::new(hook)))
    }

    /// Run `hook` in place of `object[key]`. `next.call(args)` invokes the
    /// previously installed instead hook, or the original function.
    pub fn instead<F>(&self, object: &Object, key: &str, hook: F) -> Result<Unpatch>
    where
        F: Fn(&[Value], &Next<'_>) -> CallResult + Send + Sync + 'static,
    {
        self.patch(object, key, Hook::Instead(Arc::new(hook)))
    }

    fn patch(&self, object: &Object, key: &str, hook: Hook) -> Result<Unpatch> {
        let mut states = self.inner.states.lock();
        let slot: SlotKey = (object.addr(), Arc::from(key));

        let existing = states
            .get(&slot)
            .filter(|state| state.is_installed())
            .cloned();
        let state = match existing {
            Some(state) => state,
            None => {
                let Some(Value::Function(original)) = object.get(key) else {
                    return Err(PatchError::NotAFunction {
                        key: key.to_string(),
                    });
                };
                let state = PatchState::install(object, slot.1.clone(), original);
                states.insert(slot, state.clone());
                state
            }
        };

        let (kind, index) = state.add(hook);
        drop(states);

        tracing::trace!(key, ?kind, "hook added");
        Ok(Unpatch {
            patcher: Arc::downgrade(&self.inner),
            state,
            kind,
            index,
            done: AtomicBool::new(false),
        })
    }

    /// True while `object[key]` holds a dispatcher installed by this patcher.
    pub fn is_patched(&self, object: &Object, key: &str) -> bool {
        let slot: SlotKey = (object.addr(), Arc::from(key));
        self.inner
            .states
            .lock()
            .get(&slot)
            .is_some_and(|state| state.is_installed())
    }

    /// Number of hooks currently installed on `object[key]`.
    pub fn hook_count(&self, object: &Object, key: &str) -> usize {
        let slot: SlotKey = (object.addr(), Arc::from(key));
        self.inner
            .states
            .lock()
            .get(&slot)
            .map_or(0, |state| state.hook_count())
    }

    /// Number of slots this patcher currently owns.
    pub fn patched_slots(&self) -> usize {
        self.inner.states.lock().len()
    }

    /// Remove every hook and restore every original function. Returns the
    /// number of slots restored. Outstanding [`Unpatch`] handles become
    /// no-ops.
    pub fn unpatch_all(&self) -> usize {
        let drained: Vec<_> = self.inner.states.lock().drain().map(|(_, state)| state).collect();
        for state in &drained {
            state.clear();
            state.restore();
        }
        tracing::debug!(slots = drained.len(), "removed all patches");
        drained.len()
    }
}

impl fmt::Debug for Patcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patcher")
            .field("patched_slots", &self.patched_slots())
            .finish()
    }
}

/// Removes one hook.
///
/// Dropping the handle leaves the hook installed.
#[must_use = "dropping an Unpatch leaves the hook installed with no way to remove it"]
pub struct Unpatch {
    patcher: Weak<PatcherInner>,
    state: Arc<PatchState>,
    kind: HookKind,
    index: usize,
    done: AtomicBool,
}

impl Unpatch {
    /// Remove the hook. Returns `true` only for the call that actually
    /// removed it. Removing the last hook on a slot restores the original
    /// function.
    pub fn unpatch(&self) -> bool {
        if self.done.swap(true, Ordering::AcqRel) {
            return false;
        }
        if !self.state.remove(self.kind, self.index) {
            return false;
        }

        match self.patcher.upgrade() {
            Some(patcher) => patcher.release(&self.state),
            None if self.state.is_empty() => self.state.restore(),
            None => {}
        }
        true
    }

    pub fn is_active(&self) -> bool {
        !self.done.load(Ordering::Acquire)
    }

    /// The function that was in the slot before it was first patched.
    pub fn original(&self) -> &modhook_value::Function {
        self.state.original()
    }
}

impl fmt::Debug for Unpatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unpatch")
            .field("kind", &self.kind)
            .field("active", &self.is_active())
            .finish()
    }
}
