//! # Payment Redirect & Navigation
//!
//! The two external collaborators of the session layer: the payment provider
//! that takes over after a payment session is created, and the host's router.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentRedirect (trait)                  │
//! │  ├── redirect_to_checkout()                                 │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┴─────────────────┐
//!  ┌───────┴───────────────┐         ┌─────────┴───────┐
//!  │ HostedCheckoutRedirect│         │  test doubles   │
//!  │ (URL → Navigator)     │         │                 │
//!  └───────────────────────┘         └─────────────────┘
//! ```

use crate::error::ShopResult;
use crate::intent::PaymentSession;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// Hands a created payment session to the external payment provider.
#[async_trait]
pub trait PaymentRedirect: Send + Sync {
    /// Send the user to the provider's checkout for `session`.
    async fn redirect_to_checkout(&self, session: &PaymentSession) -> ShopResult<()>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed payment redirect (dynamic dispatch)
pub type BoxedPaymentRedirect = Arc<dyn PaymentRedirect>;

/// Destinations the session layer may send the user to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    /// A page outside the storefront (payment provider)
    External(String),
}

/// The host application's router
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Type alias for a shared navigator
pub type BoxedNavigator = Arc<dyn Navigator>;

/// Navigator that records every route it is asked to show.
///
/// Useful for headless hosts and tests.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(?route, "Navigating");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new();
        assert!(nav.last().is_none());

        nav.navigate(Route::Login);
        nav.navigate(Route::External("https://pay.example.com/cs_1".into()));

        assert_eq!(nav.history().len(), 2);
        assert_eq!(
            nav.last(),
            Some(Route::External("https://pay.example.com/cs_1".into()))
        );
    }
}
