//! # Session Events
//!
//! Typed event bus for signals that cross component boundaries outside of
//! normal call/return. The interceptor publishes; whoever cares subscribes.
//! Publishers never know their subscribers.

use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Signals raised by the session layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Silent credential renewal failed; the session is gone
    RenewalFailed,
}

/// Event listener trait
///
/// Implement this to react to session events. Listeners run inline on the
/// publishing task, so they must not block.
pub trait SessionListener: Send + Sync {
    fn on_event(&self, event: SessionEvent);
}

impl<F> SessionListener for F
where
    F: Fn(SessionEvent) + Send + Sync,
{
    fn on_event(&self, event: SessionEvent) {
        self(event)
    }
}

/// Handle returned by [`SessionEvents::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn SessionListener>)>,
}

/// Shared event bus. Clones publish to and subscribe on the same bus.
#[derive(Clone, Default)]
pub struct SessionEvents {
    listeners: Arc<RwLock<Listeners>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners may subscribe at any point in the
    /// client's lifetime and receive every event published afterwards,
    /// until they are unsubscribed.
    pub fn subscribe(&self, listener: Arc<dyn SessionListener>) -> ListenerId {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    /// Deliver an event to every registered listener
    pub fn publish(&self, event: SessionEvent) {
        // Snapshot so a listener may (un)subscribe without deadlocking
        let listeners: Vec<_> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        debug!(?event, listeners = listeners.len(), "Publishing session event");

        for listener in listeners {
            listener.on_event(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

impl std::fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_all_listeners() {
        let bus = SessionEvents::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let hits = Arc::clone(&hits);
            bus.subscribe(Arc::new(move |event: SessionEvent| {
                assert_eq!(event, SessionEvent::RenewalFailed);
                hits.fetch_add(1, Ordering::SeqCst);
            }));
        }

        bus.publish(SessionEvent::RenewalFailed);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_late_subscriber_receives_later_events() {
        let bus = SessionEvents::new();
        let publisher = bus.clone();
        publisher.publish(SessionEvent::RenewalFailed);

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        bus.subscribe(Arc::new(move |_: SessionEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        publisher.publish(SessionEvent::RenewalFailed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(publisher.listener_count(), 1);
    }

    #[test]
    fn test_unsubscribed_listener_is_skipped() {
        let bus = SessionEvents::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = bus.subscribe(Arc::new(move |_: SessionEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let other = bus.subscribe(Arc::new(|_: SessionEvent| {}));
        assert_ne!(id, other);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(SessionEvent::RenewalFailed);

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(bus.listener_count(), 1);
    }
}
