//! # Checkout Orders
//!
//! The record handed to the order service when a cart is checked out:
//! a snapshot of the rows and their summary, plus where it ships and how
//! it will be paid. Payment itself happens elsewhere.

use crate::cart::Cart;
use crate::error::{CartError, CartResult};
use crate::item::LineItem;
use crate::pricing::{CartSummary, PricingConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// How the buyer intends to pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Mpesa,
    Evc,
    Paypill,
}

impl PaymentMethod {
    /// Mobile-money methods collect a phone number instead of card details
    pub fn is_mobile_money(&self) -> bool {
        matches!(self, PaymentMethod::Mpesa | PaymentMethod::Evc)
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Card
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

fn default_country() -> String {
    "Kenya".to_string()
}

/// Shipping address and contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub zip: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl ShippingInfo {
    /// Every field except `state` must be non-blank
    pub fn validate(&self) -> CartResult<()> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("zip", &self.zip),
            ("country", &self.country),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CartError::InvalidRequest(format!(
                "missing shipping fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// A checked-out cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    /// Human-facing order number, `ORD-<timestamp>-<suffix>`
    pub order_number: String,

    pub status: OrderStatus,

    pub items: Vec<LineItem>,

    /// Unrounded summary at checkout time
    pub summary: CartSummary,

    pub payment_method: PaymentMethod,

    pub shipping_info: ShippingInfo,

    pub created_at: DateTime<Utc>,
}

impl CheckoutOrder {
    /// Snapshot `cart` into an order. The cart itself is not modified.
    pub fn from_cart(
        cart: &Cart,
        config: &PricingConfig,
        shipping_info: ShippingInfo,
        payment_method: PaymentMethod,
    ) -> CartResult<Self> {
        if cart.is_empty() {
            return Err(CartError::InvalidRequest("Cart has no items".to_string()));
        }
        shipping_info.validate()?;

        let created_at = Utc::now();
        let order = Self {
            order_number: generate_order_number(created_at),
            status: OrderStatus::Pending,
            items: cart.items().to_vec(),
            summary: cart.summary(config)?,
            payment_method,
            shipping_info,
            created_at,
        };

        info!(
            "Created order {}: {} items, total={}",
            order.order_number,
            order.summary.item_count,
            order.summary.currency.format(order.summary.total)
        );
        Ok(order)
    }

    /// Number of units across all rows
    pub fn item_count(&self) -> u64 {
        self.summary.item_count
    }
}

/// `ORD-YYYYMMDDHHMMSS-XXXXXX` with six uppercase alphanumerics
pub fn generate_order_number(at: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .to_uppercase()
        .chars()
        .take(6)
        .collect();
    format!("ORD-{}-{}", at.format("%Y%m%d%H%M%S"), suffix)
}
