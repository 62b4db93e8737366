//! # Line Items
//!
//! A line item is one distinct purchasable configuration in the cart.
//! Identity is the [`VariantKey`]: product id plus optional size and color.

use crate::error::{CartError, CartResult};
use crate::product::CatalogProduct;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Blank attribute strings mean the attribute is absent
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn attr(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(non_blank)
}

/// Opaque product identifier assigned by the catalog.
///
/// The catalog hands out numeric ids, other callers send strings. Both are
/// accepted and stored as text, so `7` and `"7"` name the same product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawProductId")]
pub struct ProductId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProductId {
    Number(u64),
    Text(String),
}

impl From<RawProductId> for ProductId {
    fn from(raw: RawProductId) -> Self {
        match raw {
            RawProductId::Number(n) => Self(n.to_string()),
            RawProductId::Text(s) => Self(s),
        }
    }
}

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ProductId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Composite identity of a cart row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    pub id: ProductId,

    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl VariantKey {
    /// Key for a product with no size or color
    pub fn new(id: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            size: None,
            color: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Same key with blank size/color dropped
    pub fn normalized(self) -> Self {
        Self {
            id: self.id,
            size: non_blank(self.size),
            color: non_blank(self.color),
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.id,
            self.size.as_deref().unwrap_or("none"),
            self.color.as_deref().unwrap_or("none")
        )
    }
}

/// A line item in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product ID
    pub id: ProductId,

    /// Product name (denormalized for display)
    pub name: String,

    /// Unit price
    pub price: Decimal,

    /// Quantity, at least 1 while the item is in a cart
    pub quantity: u32,

    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Image reference, carried through for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl LineItem {
    /// Create a validated line item with no descriptive attributes
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
        quantity: u32,
    ) -> CartResult<Self> {
        let item = Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
            size: None,
            color: None,
            brand: None,
            category: None,
            image_url: None,
        };
        item.validate()?;
        Ok(item)
    }

    /// Seed a line item from a catalog product
    pub fn from_product(product: &CatalogProduct, quantity: u32) -> CartResult<Self> {
        let item = Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity,
            size: product.size.clone(),
            color: product.color.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            image_url: Some(product.image_reference().to_string()),
        };
        item.validate()?;
        Ok(item)
    }

    /// Check the construction invariants: `price >= 0`, `quantity >= 1`
    /// and a line total that fits in a `Decimal`.
    ///
    /// Fields are public and items arrive over the wire, so the cart calls
    /// this again before inserting.
    pub fn validate(&self) -> CartResult<()> {
        if self.price < Decimal::ZERO {
            return Err(CartError::InvalidPrice {
                product_id: self.id.to_string(),
                price: self.price,
            });
        }
        if self.quantity < 1 {
            return Err(CartError::InvalidQuantity {
                product_id: self.id.to_string(),
                quantity: i64::from(self.quantity),
            });
        }
        self.line_total()?;
        Ok(())
    }

    /// Copy with blank size/color dropped
    pub fn normalized(mut self) -> Self {
        self.size = non_blank(self.size.take());
        self.color = non_blank(self.color.take());
        self
    }

    /// The identity this item merges under
    pub fn variant_key(&self) -> VariantKey {
        VariantKey {
            id: self.id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
        .normalized()
    }

    /// Whether this item is the row for `key`. A blank attribute on either
    /// side counts as absent.
    pub fn matches(&self, key: &VariantKey) -> bool {
        self.id == key.id && attr(&self.size) == attr(&key.size) && attr(&self.color) == attr(&key.color)
    }

    /// `price × quantity`, unrounded
    pub fn line_total(&self) -> CartResult<Decimal> {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| CartError::AmountOverflow(format!("line total for {}", self.id)))
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

    /// Builder: set image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}
