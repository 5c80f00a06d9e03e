//! # Reactive Stores
//!
//! Injectable state containers with subscribe/notify semantics. The session
//! flag and the cart count are both a [`Store`]; every surface that cares
//! holds a clone or a `watch::Receiver` and sees the same value.

use std::sync::Arc;
use tokio::sync::watch;

/// A shared value that notifies subscribers when it changes.
///
/// Cloning a store yields another handle to the same value.
#[derive(Debug)]
pub struct Store<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone + PartialEq> Store<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value. Subscribers are only woken when it actually changes.
    ///
    /// Returns true if the value changed.
    pub fn set(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    /// Receiver that observes every subsequent change
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + PartialEq + Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Process-wide "is authenticated" flag (false at start)
pub type AuthState = Store<bool>;

/// Server-side cart size as last fetched (0 at start)
pub type CartCount = Store<u32>;
