//! # Product Types
//!
//! Currency handling and the catalog product record that seeds a line item.
//! The catalog itself is an external service; this crate only reads the
//! fields it needs from whatever record the catalog returns.

use crate::item::ProductId;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Image shown when a catalog record carries no image reference
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-product.jpg";

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    KES,
    JPY,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::KES => "kes",
            Currency::JPY => "jpy",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others have 2)
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Display symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::KES => "KSh ",
            Currency::JPY => "¥",
        }
    }

    /// Round an amount to this currency's minor unit, half away from zero.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimal_places(), RoundingStrategy::MidpointAwayFromZero)
    }

    /// Format an amount for display (e.g., "$123.00").
    pub fn format(&self, amount: Decimal) -> String {
        let places = self.decimal_places() as usize;
        format!("{}{:.*}", self.symbol(), places, self.round(amount))
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// A product record as returned by the catalog service
///
/// The catalog is not consistent about the image field name, so all three
/// spellings are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Catalog product id
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Unit price
    pub price: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url_camel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CatalogProduct {
    /// Create a product with only the required fields
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            brand: None,
            category: None,
            color: None,
            size: None,
            image_url_camel: None,
            image_url: None,
            image: None,
        }
    }

    /// Builder: set brand
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Builder: set category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder: set size
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Builder: set color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder: set image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url_camel = Some(url.into());
        self
    }

    /// First non-empty image reference, or the placeholder.
    pub fn image_reference(&self) -> &str {
        [&self.image_url_camel, &self.image_url, &self.image]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}
