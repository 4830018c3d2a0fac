// event.rs - Typed publish/subscribe bus
//
// Listener lists are keyed by event type id. Publish snapshots the list
// under the lock and invokes callbacks after releasing it, so listeners
// may freely subscribe or unsubscribe while a dispatch is in flight; the
// snapshot isolates the in-flight event.

use fxhash::FxHashMap;
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Marker for publishable event types. Blanket-implemented.
pub trait Event: 'static + Send + Sync {}

impl<T: 'static + Send + Sync> Event for T {}

type Listener = Arc<dyn Fn(&dyn Any) + Send + Sync>;

pub struct EventBus {
    listeners: Mutex<FxHashMap<TypeId, Vec<(u64, Listener)>>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(FxHashMap::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener for events of type `E`; returns its id.
    pub fn subscribe<E: Event>(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.listeners
            .lock()
            .unwrap()
            .entry(TypeId::of::<E>())
            .or_default()
            .push((id, listener));
        id
    }

    /// Remove a listener by id; false if it was not subscribed.
    pub fn unsubscribe<E: Event>(&self, id: u64) -> bool {
        let mut listeners = self.listeners.lock().unwrap();
        if let Some(list) = listeners.get_mut(&TypeId::of::<E>()) {
            let before = list.len();
            list.retain(|(listener_id, _)| *listener_id != id);
            return list.len() != before;
        }
        false
    }

    /// Invoke every listener of `E` in subscription order.
    pub fn publish<E: Event>(&self, event: &E) {
        let snapshot: Vec<Listener> = {
            let listeners = self.listeners.lock().unwrap();
            match listeners.get(&TypeId::of::<E>()) {
                Some(list) => list.iter().map(|(_, l)| Arc::clone(l)).collect(),
                None => return,
            }
        };
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count<E: Event>(&self) -> usize {
        self.listeners
            .lock()
            .unwrap()
            .get(&TypeId::of::<E>())
            .map(|list| list.len())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
