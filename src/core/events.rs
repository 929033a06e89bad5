use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Listener<E> = Box<dyn Fn(&E) + Send>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

/// Output surface width changed (terminal resize or explicit `--width`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthChanged(pub usize);

/// Listener registry. Each subscription is tied to a guard; dropping the
/// guard removes the listener, so a torn-down view stops receiving events.
pub struct Subscribers<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

fn lock<E>(registry: &Mutex<Registry<E>>) -> MutexGuard<'_, Registry<E>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&E) + Send + 'static) -> Subscription<E> {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, Box::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every live listener; returns how many were called.
    ///
    /// Listeners must not subscribe or unsubscribe from inside the callback.
    pub fn emit(&self, event: &E) -> usize {
        let registry = lock(&self.registry);
        for (_, listener) in &registry.listeners {
            listener(event);
        }
        registry.listeners.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Subscription<E> {
    id: u64,
    registry: Weak<Mutex<Registry<E>>>,
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
