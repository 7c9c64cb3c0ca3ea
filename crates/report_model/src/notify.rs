//! Typed notifications
//!
//! Replaces ambient broadcast events: whoever owns an export passes a
//! [`Notifier`] in and registers callbacks for the events it cares about.

use std::sync::{Arc, Mutex, MutexGuard};

/// Callback invoked for every emitted event
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle returned by [`Notifier::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

/// Cloneable fan-out of events to registered listeners
pub struct Notifier<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for Notifier<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry<E>> {
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        Subscription(id)
    }

    /// Returns false if the subscription was already removed
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut registry = self.registry();
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != subscription.0);
        registry.listeners.len() != before
    }

    /// Deliver an event; returns how many listeners received it
    pub fn emit(&self, event: &E) -> usize {
        // Listeners run outside the lock so they may subscribe or emit.
        let listeners: Vec<Listener<E>> = self
            .registry()
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.registry().listeners.len()
    }
}
