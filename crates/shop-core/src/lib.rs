//! # shop-core
//!
//! Core types and traits for the storefront session client.
//!
//! This crate provides:
//! - `Transport` trait and the `ApiRequest`/`ApiResponse` values it moves
//! - `Store<T>` reactive containers (`AuthState`, `CartCount`)
//! - `SessionEvents` bus carrying `SessionEvent::RenewalFailed`
//! - `PaymentRedirect` and `Navigator` seams for the external collaborators
//! - `ProfileCache` for the locally cached `UserProfile`
//! - Catalog/order records and the `PurchaseIntent` posted at checkout
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{AuthState, PurchaseIntent, ShippingInfo};
//!
//! let auth = AuthState::default();
//! let mut rx = auth.subscribe();
//!
//! // Some other surface logs the user in
//! auth.set(true);
//! rx.changed().await?;
//!
//! let intent = PurchaseIntent::direct(12, 1, ShippingInfo::new("1 Main St", "ON", "Toronto"));
//! assert!(intent.is_ready());
//! ```

pub mod catalog;
pub mod error;
pub mod events;
pub mod intent;
pub mod order;
pub mod profile;
pub mod redirect;
pub mod store;
pub mod transport;

// Re-exports for convenience
pub use catalog::{Category, Page, Product, ProductDraft, ProductQuery};
pub use error::{ErrorDetail, ShopError, ShopResult};
pub use events::{ListenerId, SessionEvent, SessionEvents, SessionListener};
pub use intent::{CheckoutEndpoint, IntentItem, PaymentSession, ProductRef, PurchaseIntent};
pub use order::{CartLine, Order, OrderItem, OrderStatus, ShippingInfo};
pub use profile::{BoxedProfileCache, MemoryProfileCache, ProfileCache, UserProfile, PROFILE_KEY};
pub use redirect::{
    BoxedNavigator, BoxedPaymentRedirect, Navigator, PaymentRedirect, RecordingNavigator, Route,
};
pub use store::{AuthState, CartCount, Store};
pub use transport::{ApiRequest, ApiResponse, BoxedTransport, FileUpload, Method, Transport};
