//! Per-slot patch state and the dispatcher installed in the slot.

use std::sync::{Arc, Weak};

use modhook_value::{CallError, CallResult, Function, Object, Value};
use parking_lot::Mutex;

use crate::chain::HookChain;

/// Runs before the patched function and may rewrite its arguments.
pub type BeforeHook = dyn Fn(&mut Vec<Value>) -> Result<(), CallError> + Send + Sync;

/// Runs after the patched function. Returning `Some` replaces the result.
pub type AfterHook = dyn Fn(&[Value], &Value) -> Result<Option<Value>, CallError> + Send + Sync;

/// Runs in place of the patched function; [`Next::call`] continues the chain.
pub type InsteadHook = dyn Fn(&[Value], &Next<'_>) -> CallResult + Send + Sync;

/// The rest of an instead chain: the next (older) instead hook, and the
/// original function at the bottom.
pub struct Next<'a> {
    hooks: &'a [Arc<InsteadHook>],
    original: &'a Function,
}

impl Next<'_> {
    pub fn call(&self, args: &[Value]) -> CallResult {
        match self.hooks.split_first() {
            Some((hook, rest)) => hook(
                args,
                &Next {
                    hooks: rest,
                    original: self.original,
                },
            ),
            None => self.original.call(args),
        }
    }

    /// The unpatched function.
    pub fn original(&self) -> &Function {
        self.original
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HookKind {
    Before,
    After,
    Instead,
}

#[derive(Default)]
struct Chains {
    before: HookChain<Arc<BeforeHook>>,
    after: HookChain<Arc<AfterHook>>,
    instead: HookChain<Arc<InsteadHook>>,
}

impl Chains {
    fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty() && self.instead.is_empty()
    }

    fn len(&self) -> usize {
        self.before.len() + self.after.len() + self.instead.len()
    }
}

pub(crate) enum Hook {
    Before(Arc<BeforeHook>),
    After(Arc<AfterHook>),
    Instead(Arc<InsteadHook>),
}

impl Hook {
    fn kind(&self) -> HookKind {
        match self {
            Hook::Before(_) => HookKind::Before,
            Hook::After(_) => HookKind::After,
            Hook::Instead(_) => HookKind::Instead,
        }
    }
}

/// Everything known about one patched `(object, key)` slot.
pub(crate) struct PatchState {
    object: Object,
    key: Arc<str>,
    original: Function,
    dispatcher: Function,
    chains: Mutex<Chains>,
}

impl PatchState {
    /// Wrap `original` and install the dispatcher into `object[key]`.
    pub(crate) fn install(object: &Object, key: Arc<str>, original: Function) -> Arc<Self> {
        let state = Arc::new_cyclic(|weak: &Weak<PatchState>| {
            let weak = weak.clone();
            let fallback = original.clone();
            let dispatcher = original.with_call(move |args| match weak.upgrade() {
                Some(state) => state.dispatch(args),
                None => fallback.call(args),
            });
            PatchState {
                object: object.clone(),
                key,
                original,
                dispatcher,
                chains: Mutex::new(Chains::default()),
            }
        });

        state
            .object
            .set(state.key.clone(), state.dispatcher.clone());
        tracing::debug!(key = %state.key, "installed patch dispatcher");
        state
    }

    pub(crate) fn original(&self) -> &Function {
        &self.original
    }

    /// True while the slot still holds this state's dispatcher.
    pub(crate) fn is_installed(&self) -> bool {
        matches!(
            self.object.get(&self.key),
            Some(Value::Function(current)) if current.ptr_eq(&self.dispatcher)
        )
    }

    pub(crate) fn add(&self, hook: Hook) -> (HookKind, usize) {
        let kind = hook.kind();
        let mut chains = self.chains.lock();
        let index = match hook {
            Hook::Before(hook) => chains.before.push_front(hook),
            Hook::After(hook) => chains.after.push_front(hook),
            Hook::Instead(hook) => chains.instead.push_front(hook),
        };
        (kind, index)
    }

    /// Remove one hook. Returns `false` if it was already removed.
    pub(crate) fn remove(&self, kind: HookKind, index: usize) -> bool {
        let mut chains = self.chains.lock();
        match kind {
            HookKind::Before => chains.before.remove(index),
            HookKind::After => chains.after.remove(index),
            HookKind::Instead => chains.instead.remove(index),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.chains.lock().is_empty()
    }

    pub(crate) fn hook_count(&self) -> usize {
        self.chains.lock().len()
    }

    pub(crate) fn clear(&self) {
        let mut chains = self.chains.lock();
        chains.before.clear();
        chains.after.clear();
        chains.instead.clear();
    }

    /// Put the original function back, unless the slot has been overwritten
    /// by someone else since.
    pub(crate) fn restore(&self) {
        if self.is_installed() {
            self.object.set(self.key.clone(), self.original.clone());
            tracing::debug!(key = %self.key, "restored original function");
        } else {
            tracing::debug!(key = %self.key, "slot was overwritten, leaving it alone");
        }
    }

    fn dispatch(&self, args: &[Value]) -> CallResult {
        let (before, instead, after) = {
            let chains = self.chains.lock();
            (
                chains.before.snapshot(),
                chains.instead.snapshot(),
                chains.after.snapshot(),
            )
        };

        let mut args = args.to_vec();
        for hook in &before {
            hook(&mut args)?;
        }

        let next = Next {
            hooks: &instead,
            original: &self.original,
        };
        let mut result = next.call(&args)?;

        for hook in &after {
            if let Some(replacement) = hook(&args, &result)? {
                result = replacement;
            }
        }
        Ok(result)
    }
}
