//! # cart-core
//!
//! Cart engine for the marketcart storefront.
//!
//! This crate provides:
//! - `LineItem` and `VariantKey` for cart rows and their identity
//! - `Cart` for merge/update/remove/clear over those rows
//! - `PricingConfig` and `CartSummary` for subtotal, tax, shipping and total
//! - `CheckoutOrder` for the payload handed to the order service
//! - `CartError` for typed error handling
//!
//! ## Example
//!
//! ```rust
//! use cart_core::{Cart, LineItem, PricingConfig, VariantKey};
//! use rust_decimal::Decimal;
//!
//! let mut cart = Cart::new();
//! cart.add_or_merge(LineItem::new(1u64, "Jacket", Decimal::new(60, 0), 2)?)?;
//!
//! let summary = cart.summary(&PricingConfig::default())?;
//! assert_eq!(summary.total, Decimal::new(12960, 2));
//!
//! cart.set_quantity(&VariantKey::new(1u64), 0)?;
//! assert!(cart.is_empty());
//! # Ok::<(), cart_core::CartError>(())
//! ```

pub mod cart;
pub mod error;
pub mod item;
pub mod order;
pub mod pricing;
pub mod product;

// Re-exports for convenience
pub use cart::{AddOutcome, Cart};
pub use error::{CartError, CartResult};
pub use item::{LineItem, ProductId, VariantKey};
pub use order::{generate_order_number, CheckoutOrder, OrderStatus, PaymentMethod, ShippingInfo};
pub use pricing::{CartSummary, PricingConfig, SummaryDisplay};
pub use product::{CatalogProduct, Currency, PLACEHOLDER_IMAGE};
