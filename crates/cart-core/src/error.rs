//! # Cart Error Types
//!
//! Typed error handling for the cart engine.
//! Only malformed input is an error; removing or updating a variant that is
//! not in the cart is a no-op and never surfaces here.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core error type for all cart operations
#[derive(Debug, Error)]
pub enum CartError {
    /// Unit price below zero
    #[error("Invalid price for {product_id}: {price} (must be >= 0)")]
    InvalidPrice { product_id: String, price: Decimal },

    /// Requested quantity below one on add
    #[error("Invalid quantity for {product_id}: {quantity} (must be >= 1)")]
    InvalidQuantity { product_id: String, quantity: i64 },

    /// Merging would overflow the quantity counter
    #[error("Quantity overflow for {product_id}")]
    QuantityOverflow { product_id: String },

    /// A line total, subtotal, tax or total too large for `Decimal`
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration errors (bad pricing file, bad env override)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Cart id unknown to the store
    #[error("Cart not found: {cart_id}")]
    CartNotFound { cart_id: String },
}

impl CartError {
    /// Returns true if the caller supplied bad input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CartError::InvalidPrice { .. }
                | CartError::InvalidQuantity { .. }
                | CartError::QuantityOverflow { .. }
                | CartError::AmountOverflow(_)
                | CartError::InvalidRequest(_)
                | CartError::CartNotFound { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::InvalidPrice { .. } => 400,
            CartError::InvalidQuantity { .. } => 400,
            CartError::QuantityOverflow { .. } => 422,
            CartError::AmountOverflow(_) => 422,
            CartError::InvalidRequest(_) => 400,
            CartError::Configuration(_) => 500,
            CartError::CartNotFound { .. } => 404,
        }
    }
}

/// Result type alias for cart operations
pub type CartResult<T> = Result<T, CartError>;
