//! # Checkout Orchestrator
//!
//! Turns a purchase intent into a payment session on the backend, then hands
//! the session to the external payment provider.

use crate::cart::CartCountStore;
use crate::interceptor::SessionClient;
use shop_core::{
    ApiRequest, BoxedPaymentRedirect, CheckoutEndpoint, PaymentSession, PurchaseIntent, ShopError,
    ShopResult,
};
use tracing::{error, info, instrument};

/// Checkout flow: create payment session, refresh cart count, redirect.
///
/// The intent is trusted as given; callers check
/// [`PurchaseIntent::is_ready`] before asking for a checkout.
pub struct CheckoutOrchestrator {
    client: SessionClient,
    cart: CartCountStore,
    redirect: BoxedPaymentRedirect,
}

impl CheckoutOrchestrator {
    pub fn new(client: SessionClient, cart: CartCountStore, redirect: BoxedPaymentRedirect) -> Self {
        Self {
            client,
            cart,
            redirect,
        }
    }

    /// Run a checkout against `endpoint`.
    ///
    /// Backend rejections (inventory, shipping) come back unchanged for inline
    /// display and are not retried. A provider failure after the session was
    /// created is returned as [`ShopError::Redirect`].
    #[instrument(
        skip(self, endpoint, intent),
        fields(endpoint = endpoint.path(), items = intent.items().len(), provider = self.redirect.provider_name())
    )]
    pub async fn checkout(
        &self,
        endpoint: &CheckoutEndpoint,
        intent: &PurchaseIntent,
    ) -> ShopResult<PaymentSession> {
        let request = ApiRequest::post(endpoint.path()).with_json(intent)?;

        let session: PaymentSession = self.client.json(&request).await.map_err(|e| {
            error!("Failed to create payment session: {}", e);
            e
        })?;

        info!("Created payment session: id={}", session.id);

        // The backend has recorded an order; the cart may have changed
        self.cart.fetch_count().await;

        self.redirect
            .redirect_to_checkout(&session)
            .await
            .map_err(|e| {
                error!(session_id = %session.id, "Payment redirect failed: {}", e);
                match e {
                    ShopError::Redirect(_) => e,
                    other => ShopError::Redirect(other.to_string()),
                }
            })?;

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CART_COUNT_PATH;
    use crate::testing::{failure, ok, ScriptedTransport};
    use async_trait::async_trait;
    use serde_json::json;
    use shop_core::{PaymentRedirect, ShippingInfo};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct SpyRedirect {
        sessions: Mutex<Vec<PaymentSession>>,
        fail: bool,
    }

    #[async_trait]
    impl PaymentRedirect for SpyRedirect {
        async fn redirect_to_checkout(&self, session: &PaymentSession) -> ShopResult<()> {
            self.sessions.lock().unwrap().push(session.clone());
            if self.fail {
                return Err(ShopError::Network("provider unreachable".into()));
            }
            Ok(())
        }

        fn provider_name(&self) -> &'static str {
            "spy"
        }
    }

    fn orchestrator(
        transport: ScriptedTransport,
        redirect: Arc<SpyRedirect>,
    ) -> (Arc<ScriptedTransport>, CheckoutOrchestrator) {
        let transport = Arc::new(transport);
        let client = SessionClient::new(transport.clone());
        let cart = CartCountStore::new(client.clone());
        (transport, CheckoutOrchestrator::new(client, cart, redirect))
    }

    fn shipping() -> ShippingInfo {
        ShippingInfo::new("1 Main St", "Ontario", "Toronto")
    }

    #[tokio::test]
    async fn test_redirects_exactly_once() {
        let redirect = Arc::new(SpyRedirect::default());
        let (transport, checkout) = orchestrator(
            ScriptedTransport::new()
                .always("/payments/direct_checkout/", ok(json!({"id": "cs_test_42"})))
                .always(CART_COUNT_PATH, ok(json!({"count": 0}))),
            redirect.clone(),
        );
        let intent = PurchaseIntent::direct(12, 1, shipping());

        let session = checkout
            .checkout(&CheckoutEndpoint::Direct, &intent)
            .await
            .unwrap();

        assert_eq!(session.id, "cs_test_42");
        assert_eq!(*redirect.sessions.lock().unwrap(), vec![PaymentSession::new("cs_test_42")]);

        let posted = &transport.requests()[0];
        assert_eq!(posted.body, Some(serde_json::to_value(&intent).unwrap()));
        assert_eq!(transport.count(CART_COUNT_PATH), 1);
    }

    #[tokio::test]
    async fn test_backend_rejection_skips_redirect() {
        let redirect = Arc::new(SpyRedirect::default());
        let (transport, checkout) = orchestrator(
            ScriptedTransport::new().always(
                "/payments/cart_checkout/",
                Err(ShopError::from_status(400, json!({"detail": "Not enough inventory"}))),
            ),
            redirect.clone(),
        );

        let err = checkout
            .checkout(&CheckoutEndpoint::Cart, &PurchaseIntent::from_cart([3], shipping()))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Not enough inventory");
        assert!(redirect.sessions.lock().unwrap().is_empty());
        assert_eq!(transport.count("/payments/cart_checkout/"), 1);
    }

    #[tokio::test]
    async fn test_server_failure_is_not_retried() {
        let redirect = Arc::new(SpyRedirect::default());
        let (transport, checkout) = orchestrator(
            ScriptedTransport::new().always("/payments/cart_checkout/", failure(500)),
            redirect.clone(),
        );

        let err = checkout
            .checkout(&CheckoutEndpoint::Cart, &PurchaseIntent::from_cart([3], shipping()))
            .await
            .unwrap_err();

        assert!(matches!(err, ShopError::Server { status: 500, .. }));
        assert_eq!(transport.count("/payments/cart_checkout/"), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_as_redirect_error() {
        let redirect = Arc::new(SpyRedirect {
            fail: true,
            ..SpyRedirect::default()
        });
        let (_, checkout) = orchestrator(
            ScriptedTransport::new()
                .always("/payments/checkout/", ok(json!({"id": "cs_1"})))
                .always(CART_COUNT_PATH, ok(json!({"count": 0}))),
            redirect.clone(),
        );

        let err = checkout
            .checkout(
                &CheckoutEndpoint::Custom("/payments/checkout/".into()),
                &PurchaseIntent::direct(1, 1, shipping()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ShopError::Redirect(ref msg) if msg.contains("provider unreachable")));
        assert_eq!(redirect.sessions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_session_response() {
        let redirect = Arc::new(SpyRedirect::default());
        let (_, checkout) = orchestrator(
            ScriptedTransport::new().always("/payments/direct_checkout/", ok(json!({"url": "x"}))),
            redirect.clone(),
        );

        let err = checkout
            .checkout(&CheckoutEndpoint::Direct, &PurchaseIntent::direct(1, 1, shipping()))
            .await
            .unwrap_err();

        assert!(matches!(err, ShopError::Decode(_)));
        assert!(redirect.sessions.lock().unwrap().is_empty());
    }
}
