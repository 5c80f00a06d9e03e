//! # Hosted Checkout Redirect
//!
//! [`PaymentRedirect`] for providers that host their own checkout page.
//! The session reference is substituted into a URL template and the user is
//! sent there through the host's [`Navigator`].
//!
//! Use this when:
//! - The provider exposes a per-session checkout URL
//! - The host can open external URLs (browser, webview, terminal link)

use crate::config::ClientConfig;
use async_trait::async_trait;
use shop_core::{
    BoxedNavigator, PaymentRedirect, PaymentSession, Route, ShopError, ShopResult,
};
use tracing::{debug, instrument};

/// Placeholder replaced by the payment session ID
pub const SESSION_PLACEHOLDER: &str = "{session_id}";

/// Redirects to `template` with the session ID filled in
pub struct HostedCheckoutRedirect {
    template: String,
    navigator: BoxedNavigator,
}

impl HostedCheckoutRedirect {
    pub fn new(template: impl Into<String>, navigator: BoxedNavigator) -> Self {
        Self {
            template: template.into(),
            navigator,
        }
    }

    /// Use the configured checkout URL template
    pub fn from_config(config: &ClientConfig, navigator: BoxedNavigator) -> Self {
        Self::new(config.checkout_url_template.clone(), navigator)
    }

    /// Hosted checkout URL for `session`
    pub fn checkout_url(&self, session: &PaymentSession) -> ShopResult<String> {
        if session.id.trim().is_empty() {
            return Err(ShopError::Redirect("Payment session has no id".to_string()));
        }
        if !self.template.contains(SESSION_PLACEHOLDER) {
            return Err(ShopError::Redirect(format!(
                "Checkout URL template has no {} placeholder",
                SESSION_PLACEHOLDER
            )));
        }
        Ok(self.template.replace(SESSION_PLACEHOLDER, &session.id))
    }
}

#[async_trait]
impl PaymentRedirect for HostedCheckoutRedirect {
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn redirect_to_checkout(&self, session: &PaymentSession) -> ShopResult<()> {
        let url = self.checkout_url(session)?;
        debug!("Redirecting to hosted checkout: {}", url);
        self.navigator.navigate(Route::External(url));
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "hosted_checkout"
    }
}
