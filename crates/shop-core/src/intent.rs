//! # Purchase Intent
//!
//! The client-side description of what a user wants to buy and where to ship
//! it, built fresh for every checkout attempt and never persisted.

use crate::order::ShippingInfo;
use serde::{Deserialize, Serialize, Serializer};

/// What a purchase line points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductRef {
    /// An existing line in the server-side cart
    CartLine(u64),
    /// A catalog product bought directly
    Product(u64),
}

/// One line of a purchase intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentItem {
    pub product: ProductRef,
    /// `None` for cart lines, whose quantity lives on the server-side line
    pub quantity: Option<u32>,
}

/// The two shapes the checkout endpoints accept
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lines {
    Cart(Vec<u64>),
    Direct { product_id: u64, quantity: u32 },
}

/// Items plus shipping details posted to a checkout endpoint.
///
/// Either a set of cart lines or exactly one directly bought product; the
/// constructors are the only way to build one, so every intent maps onto
/// the backend payload without loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseIntent {
    lines: Lines,
    shipping: ShippingInfo,
}

impl PurchaseIntent {
    /// Check out selected cart lines
    pub fn from_cart(cart_ids: impl IntoIterator<Item = u64>, shipping: ShippingInfo) -> Self {
        Self {
            lines: Lines::Cart(cart_ids.into_iter().collect()),
            shipping,
        }
    }

    /// Buy a single product without going through the cart
    pub fn direct(product_id: u64, quantity: u32, shipping: ShippingInfo) -> Self {
        Self {
            lines: Lines::Direct {
                product_id,
                quantity,
            },
            shipping,
        }
    }

    /// Caller-side precondition for checkout: at least one item, positive
    /// quantity and complete shipping fields.
    pub fn is_ready(&self) -> bool {
        let has_items = match self.lines {
            Lines::Cart(ref ids) => !ids.is_empty(),
            Lines::Direct { quantity, .. } => quantity > 0,
        };
        has_items && self.shipping.is_complete()
    }

    pub fn items(&self) -> Vec<IntentItem> {
        match self.lines {
            Lines::Cart(ref ids) => ids
                .iter()
                .map(|&id| IntentItem {
                    product: ProductRef::CartLine(id),
                    quantity: None,
                })
                .collect(),
            Lines::Direct {
                product_id,
                quantity,
            } => vec![IntentItem {
                product: ProductRef::Product(product_id),
                quantity: Some(quantity),
            }],
        }
    }

    pub fn shipping(&self) -> &ShippingInfo {
        &self.shipping
    }

    /// Cart line IDs; empty for a direct purchase
    pub fn cart_ids(&self) -> &[u64] {
        match self.lines {
            Lines::Cart(ref ids) => ids,
            Lines::Direct { .. } => &[],
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum IntentPayload<'a> {
    Cart {
        cart_ids: &'a [u64],
        shipping_info: &'a ShippingInfo,
    },
    Direct {
        product_id: u64,
        quantity: u32,
        shipping_info: &'a ShippingInfo,
    },
}

impl Serialize for PurchaseIntent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let payload = match self.lines {
            Lines::Cart(ref ids) => IntentPayload::Cart {
                cart_ids: ids,
                shipping_info: &self.shipping,
            },
            Lines::Direct {
                product_id,
                quantity,
            } => IntentPayload::Direct {
                product_id,
                quantity,
                shipping_info: &self.shipping,
            },
        };
        payload.serialize(serializer)
    }
}

/// Backend endpoint that turns a purchase intent into a payment session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEndpoint {
    /// `/payments/cart_checkout/`
    Cart,
    /// `/payments/direct_checkout/`
    Direct,
    /// Any other path
    Custom(String),
}

impl CheckoutEndpoint {
    pub fn path(&self) -> &str {
        match self {
            CheckoutEndpoint::Cart => "/payments/cart_checkout/",
            CheckoutEndpoint::Direct => "/payments/direct_checkout/",
            CheckoutEndpoint::Custom(path) => path,
        }
    }
}

/// Opaque payment-session reference returned by the checkout endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Provider session ID
    pub id: String,
}

impl PaymentSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
