//! # Storefront
//!
//! Wires one shared [`SessionClient`] into every surface that needs it:
//! session lifecycle, cart count, checkout and the typed API.

use crate::api::StorefrontApi;
use crate::cart::CartCountStore;
use crate::checkout::CheckoutOrchestrator;
use crate::config::ClientConfig;
use crate::interceptor::SessionClient;
use crate::profile::FileProfileCache;
use crate::redirect::HostedCheckoutRedirect;
use crate::session::SessionStore;
use crate::transport::{CredentialContext, HttpTransport, COOKIE_FILE};
use shop_core::{
    BoxedNavigator, BoxedPaymentRedirect, BoxedProfileCache, BoxedTransport, ShopResult,
};
use std::sync::Arc;
use tracing::info;

/// The assembled client
#[derive(Clone)]
pub struct Storefront {
    pub client: SessionClient,
    pub session: SessionStore,
    pub cart: CartCountStore,
    pub checkout: Arc<CheckoutOrchestrator>,
    pub api: StorefrontApi,
}

impl Storefront {
    /// Build the HTTP stack from `config`.
    ///
    /// The profile and the session cookies are kept on disk under
    /// `config.profile_dir`, so a later process resumes the session. Payments
    /// go through the hosted checkout page.
    pub fn new(config: &ClientConfig, navigator: BoxedNavigator) -> ShopResult<Self> {
        config.validate()?;

        let credentials = CredentialContext::persistent(config.profile_dir.join(COOKIE_FILE));
        let transport = HttpTransport::new(config, credentials)?;
        let profile = Arc::new(FileProfileCache::new(&config.profile_dir));
        let redirect = Arc::new(HostedCheckoutRedirect::from_config(config, navigator.clone()));

        info!(
            base_url = config.base_url(),
            profile = %profile.path().display(),
            "Storefront client ready"
        );

        Ok(Self::with_parts(Arc::new(transport), profile, navigator, redirect))
    }

    /// Assemble from already-built collaborators
    pub fn with_parts(
        transport: BoxedTransport,
        profile: BoxedProfileCache,
        navigator: BoxedNavigator,
        redirect: BoxedPaymentRedirect,
    ) -> Self {
        let client = SessionClient::new(transport);
        let cart = CartCountStore::new(client.clone());
        let session = SessionStore::new(client.clone(), cart.clone(), profile, navigator);
        let checkout = CheckoutOrchestrator::new(client.clone(), cart.clone(), redirect);
        let api = StorefrontApi::new(client.clone(), cart.clone());

        Self {
            client,
            session,
            cart,
            checkout: Arc::new(checkout),
            api,
        }
    }
}
