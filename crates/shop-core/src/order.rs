//! # Order Types
//!
//! Cart lines, shipping details, orders and the purchase intent posted to
//! the checkout endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A line in the user's server-side cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: u64,

    pub user: u64,

    /// Product ID
    pub product: u64,

    /// Product name (denormalized for display)
    pub product_name: String,

    /// Decimal unit price
    pub unit_price: String,

    /// Line total
    pub total: f64,

    pub quantity: u32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Where an order ships to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
}

impl ShippingInfo {
    pub fn new(
        address: impl Into<String>,
        province: impl Into<String>,
        municipality: impl Into<String>,
    ) -> Self {
        Self {
            address: Some(address.into()),
            province: Some(province.into()),
            municipality: Some(municipality.into()),
        }
    }

    /// Every field present and non-blank
    pub fn is_complete(&self) -> bool {
        [&self.address, &self.province, &self.municipality]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

/// Payment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
}

/// An order placed through checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,

    pub user: u64,

    pub shipping_info: ShippingInfo,

    pub status: OrderStatus,

    #[serde(default)]
    pub is_cancelled: bool,

    /// Payment provider session that paid (or will pay) for this order
    #[serde(default)]
    pub stripe_checkout_session_id: Option<String>,

    pub total: f64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid && !self.is_cancelled
    }
}

/// A product line belonging to an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order: u64,
    pub product: u64,
    pub product_name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shipping_completeness() {
        assert!(ShippingInfo::new("1 Main St", "Ontario", "Toronto").is_complete());
        assert!(!ShippingInfo::new("1 Main St", "  ", "Toronto").is_complete());
        assert!(!ShippingInfo::default().is_complete());
    }

    #[test]
    fn test_shipping_skips_missing_fields() {
        let info = ShippingInfo {
            address: Some("1 Main St".into()),
            ..ShippingInfo::default()
        };
        assert_eq!(serde_json::to_value(&info).unwrap(), json!({"address": "1 Main St"}));
    }

    #[test]
    fn test_order_deserialize() {
        let order: Order = serde_json::from_value(json!({
            "id": 1,
            "user": 2,
            "shipping_info": {"address": "1 Main St", "province": "ON", "municipality": "Toronto"},
            "status": "paid",
            "is_cancelled": false,
            "stripe_checkout_session_id": "cs_test_123",
            "total": 42.5,
            "created_at": "2023-05-01T12:00:00Z",
            "updated_at": "2023-05-01T12:00:00Z"
        }))
        .unwrap();

        assert!(order.is_paid());
        assert!(order.shipping_info.is_complete());
    }
}
