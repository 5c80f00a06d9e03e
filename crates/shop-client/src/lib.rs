//! # shop-client
//!
//! The storefront's resilient session layer over HTTP.
//!
//! Layers, leaves first:
//!
//! 1. **HttpTransport** - `reqwest` client with a persistable cookie-store credential context
//! 2. **SessionClient** - renews an expired session once, then retries once
//! 3. **SessionStore** - reactive auth flag, login/logout/restore
//! 4. **CartCountStore** - reactive cart size, fail-soft
//! 5. **CheckoutOrchestrator** - payment session, then provider redirect
//!
//! [`StorefrontApi`] covers the remaining catalog, cart and order calls, and
//! [`Storefront`] wires everything around a single shared client.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_client::{ClientConfig, Credentials, Storefront};
//! use shop_core::RecordingNavigator;
//! use std::sync::Arc;
//!
//! let config = ClientConfig::load()?;
//! let shop = Storefront::new(&config, Arc::new(RecordingNavigator::new()))?;
//!
//! if !shop.session.initialize().await {
//!     shop.session.login(&Credentials::new("rex", "hunter22")).await?;
//! }
//!
//! println!("{} item(s) in cart", shop.cart.count());
//! ```

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod interceptor;
pub mod profile;
pub mod redirect;
pub mod session;
pub mod storefront;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-exports
pub use api::{RegisteredUser, Registration, StorefrontApi};
pub use cart::CartCountStore;
pub use checkout::CheckoutOrchestrator;
pub use config::ClientConfig;
pub use interceptor::SessionClient;
pub use profile::FileProfileCache;
pub use redirect::HostedCheckoutRedirect;
pub use session::{Credentials, SessionStore};
pub use storefront::Storefront;
pub use transport::{CredentialContext, HttpTransport, COOKIE_FILE};
