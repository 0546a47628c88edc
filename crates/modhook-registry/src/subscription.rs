//! Subscriber sets and unsubscribe handles.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;

use crate::ModuleId;

type Cancel = Box<dyn FnOnce() + Send>;

/// Handle returned by every subscribe operation.
///
/// Cloning shares the handle. [`Subscription::unsubscribe`] is idempotent:
/// the first call removes the subscriber and returns `true`, later calls (or
/// calls after a one-shot subscriber already fired and removed itself) return
/// `false`. Dropping a handle does **not** unsubscribe.
#[derive(Clone)]
pub struct Subscription {
    cancel: Arc<Mutex<Option<Cancel>>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Arc::new(Mutex::new(Some(Box::new(cancel)))),
        }
    }

    /// A handle with nothing to cancel.
    pub fn noop() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(None)),
        }
    }

    pub fn unsubscribe(&self) -> bool {
        // Take the closure first so a cancel that re-enters this handle sees
        // it as already cancelled.
        let cancel = self.cancel.lock().take();
        match cancel {
            Some(cancel) => {
                cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.lock().is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

struct SubscriberTable<F: ?Sized> {
    next_token: u64,
    any: IndexMap<u64, Arc<F>>,
    by_id: HashMap<ModuleId, IndexMap<u64, Arc<F>>>,
}

/// Subscribers for one lifecycle event: a set listening to every module and
/// one-shot sets keyed by module id.
pub(crate) struct Subscribers<F: ?Sized> {
    table: Arc<Mutex<SubscriberTable<F>>>,
}

impl<F: ?Sized + Send + Sync + 'static> Subscribers<F> {
    pub(crate) fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(SubscriberTable {
                next_token: 0,
                any: IndexMap::new(),
                by_id: HashMap::default(),
            })),
        }
    }

    pub(crate) fn subscribe_any(&self, callback: Arc<F>) -> Subscription {
        let token = {
            let mut table = self.table.lock();
            let token = table.next_token;
            table.next_token += 1;
            table.any.insert(token, callback);
            token
        };

        let weak = Arc::downgrade(&self.table);
        Subscription::new(move || {
            if let Some(table) = Weak::upgrade(&weak) {
                table.lock().any.shift_remove(&token);
            }
        })
    }

    pub(crate) fn subscribe_id(&self, id: ModuleId, callback: Arc<F>) -> Subscription {
        let token = {
            let mut table = self.table.lock();
            let token = table.next_token;
            table.next_token += 1;
            table.by_id.entry(id).or_default().insert(token, callback);
            token
        };

        let weak = Arc::downgrade(&self.table);
        Subscription::new(move || {
            if let Some(table) = Weak::upgrade(&weak) {
                let mut table = table.lock();
                if let Some(set) = table.by_id.get_mut(&id) {
                    set.shift_remove(&token);
                    if set.is_empty() {
                        table.by_id.remove(&id);
                    }
                }
            }
        })
    }

    /// Invoke every "any" subscriber, then every subscriber for `id` (which
    /// are consumed).
    ///
    /// Works on a snapshot taken before the first call, so subscribers may
    /// (un)subscribe from inside the callback. A panicking subscriber is
    /// logged and skipped.
    pub(crate) fn dispatch(&self, id: ModuleId, event: &'static str, mut invoke: impl FnMut(&F)) {
        let (any, targeted) = {
            let mut table = self.table.lock();
            let any: Vec<Arc<F>> = table.any.values().cloned().collect();
            let targeted: Vec<Arc<F>> = table
                .by_id
                .remove(&id)
                .map(|set| set.into_values().collect())
                .unwrap_or_default();
            (any, targeted)
        };

        for callback in any.iter().chain(targeted.iter()) {
            if catch_unwind(AssertUnwindSafe(|| invoke(callback))).is_err() {
                tracing::error!(module = %id, event, "lifecycle subscriber panicked");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        let table = self.table.lock();
        table.any.len() + table.by_id.values().map(IndexMap::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Callback = dyn Fn(ModuleId) + Send + Sync;

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let subscribers: Subscribers<Callback> = Subscribers::new();
        let sub = subscribers.subscribe_any(Arc::new(|_| {}));

        assert!(sub.is_active());
        assert!(sub.unsubscribe());
        assert!(!sub.unsubscribe());
        assert!(!sub.is_active());
        assert_eq!(subscribers.len(), 0);
    }

    #[test]
    fn test_targeted_subscribers_fire_once() {
        let subscribers: Subscribers<Callback> = Subscribers::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        subscribers.subscribe_id(
            ModuleId::new(3),
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        subscribers.dispatch(ModuleId::new(2), "test", |cb| cb(ModuleId::new(2)));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        subscribers.dispatch(ModuleId::new(3), "test", |cb| cb(ModuleId::new(3)));
        subscribers.dispatch(ModuleId::new(3), "test", |cb| cb(ModuleId::new(3)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(subscribers.len(), 0);
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let subscribers: Subscribers<Callback> = Subscribers::new();
        let hits = Arc::new(AtomicUsize::new(0));

        subscribers.subscribe_any(Arc::new(|_| panic!("subscriber failure")));
        let counter = hits.clone();
        subscribers.subscribe_any(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        subscribers.dispatch(ModuleId::new(1), "test", |cb| cb(ModuleId::new(1)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_during_dispatch() {
        let subscribers: Subscribers<Callback> = Subscribers::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let counter = hits.clone();
        let own = slot.clone();
        let sub = subscribers.subscribe_any(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = own.lock().as_ref() {
                sub.unsubscribe();
            }
        }));
        *slot.lock() = Some(sub);

        subscribers.dispatch(ModuleId::new(1), "test", |cb| cb(ModuleId::new(1)));
        subscribers.dispatch(ModuleId::new(2), "test", |cb| cb(ModuleId::new(2)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
