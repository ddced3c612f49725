//! Session lifecycle listeners
//!
//! [`LifecycleEvents`] is the observer registry for events that concern the
//! whole session owner (closing, losing visibility). Subscribing returns a
//! [`ListenerId`] that unsubscribes again; [`attach_cleanup_listeners`] wires
//! the chat session purge and hands back a guard that detaches it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::session::store::purge_slot;
use crate::storage::SessionStorage;

/// Events raised by the owner of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// The session owner is about to go away
    BeforeUnload,
    /// The session owner became hidden or visible
    VisibilityChange,
}

/// Handle identifying one registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(LifecycleEvent) + Send + Sync>;

struct Registration {
    id: ListenerId,
    event: LifecycleEvent,
    listener: Listener,
}

/// Registry of lifecycle listeners
#[derive(Default)]
pub struct LifecycleEvents {
    registrations: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
}

impl LifecycleEvents {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `event`
    pub fn add_listener<F>(&self, event: LifecycleEvent, listener: F) -> ListenerId
    where
        F: Fn(LifecycleEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.lock().push(Registration {
            id,
            event,
            listener: Arc::new(listener),
        });
        id
    }

    /// Unregister a listener; returns `false` if it was not registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations.lock();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        registrations.len() != before
    }

    /// Invoke every listener registered for `event`, in registration order
    ///
    /// Listeners run outside the registry lock and may unsubscribe
    /// themselves. Returns the number of listeners invoked.
    pub fn dispatch(&self, event: LifecycleEvent) -> usize {
        let listeners: Vec<Listener> = self
            .registrations
            .lock()
            .iter()
            .filter(|r| r.event == event)
            .map(|r| r.listener.clone())
            .collect();

        debug!(?event, listeners = listeners.len(), "Dispatching lifecycle event");
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    /// Number of listeners registered for `event`
    pub fn listener_count(&self, event: LifecycleEvent) -> usize {
        self.registrations
            .lock()
            .iter()
            .filter(|r| r.event == event)
            .count()
    }
}

impl std::fmt::Debug for LifecycleEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleEvents")
            .field("listeners", &self.registrations.lock().len())
            .finish()
    }
}

/// Teardown handle for the chat session cleanup listeners
///
/// Detaches on [`detach`](Self::detach) or when dropped, whichever comes
/// first.
#[must_use = "dropping the handle detaches the cleanup listeners"]
pub struct CleanupListeners {
    events: Arc<LifecycleEvents>,
    ids: Vec<ListenerId>,
}

impl CleanupListeners {
    /// Remove both listeners from the registry
    pub fn detach(mut self) {
        self.detach_all();
    }

    /// Whether the listeners are still registered
    pub fn is_attached(&self) -> bool {
        !self.ids.is_empty()
    }

    fn detach_all(&mut self) {
        for id in self.ids.drain(..) {
            self.events.remove_listener(id);
        }
    }
}

impl Drop for CleanupListeners {
    fn drop(&mut self) {
        self.detach_all();
    }
}

impl std::fmt::Debug for CleanupListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupListeners")
            .field("ids", &self.ids)
            .finish()
    }
}

/// Register the listeners that purge a chat session when its owner ends
///
/// `BeforeUnload` removes the storage slot; the in-memory store is left
/// alone since its owner is terminating. `VisibilityChange` is wired but
/// does nothing: it is the hook point for inactivity clearing, which is
/// not implemented.
pub fn attach_cleanup_listeners(
    events: &Arc<LifecycleEvents>,
    storage: Arc<dyn SessionStorage>,
    storage_key: impl Into<String>,
) -> CleanupListeners {
    let storage_key = storage_key.into();

    let unload = events.add_listener(LifecycleEvent::BeforeUnload, move |_| {
        debug!(key = %storage_key, "Purging chat session before unload");
        purge_slot(storage.as_ref(), &storage_key);
    });
    let visibility = events.add_listener(LifecycleEvent::VisibilityChange, |_| {
        trace!("Visibility changed");
    });

    CleanupListeners {
        events: events.clone(),
        ids: vec![unload, visibility],
    }
}
