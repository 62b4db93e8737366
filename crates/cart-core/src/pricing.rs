//! # Pricing
//!
//! Derived price summary for a set of line items.
//!
//! Nothing here is cached: the summary is a pure fold over the current
//! items and is recomputed on every read. Amounts are accumulated at full
//! precision and only rounded when presented.

use crate::error::{CartError, CartResult};
use crate::item::LineItem;
use crate::product::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, trace, warn};

/// Pricing configuration
///
/// Loaded from `config/pricing.toml`, then overridden by environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Tax rate applied to the subtotal (0.08 = 8%)
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,

    /// Subtotals strictly above this ship free
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: Decimal,

    /// Shipping fee charged at or below the threshold
    #[serde(default = "default_flat_shipping_fee")]
    pub flat_shipping_fee: Decimal,

    /// Currency used when formatting amounts
    #[serde(default)]
    pub currency: Currency,
}

fn default_tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

fn default_free_shipping_threshold() -> Decimal {
    Decimal::new(100, 0)
}

fn default_flat_shipping_fee() -> Decimal {
    Decimal::new(15, 0)
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            free_shipping_threshold: default_free_shipping_threshold(),
            flat_shipping_fee: default_flat_shipping_fee(),
            currency: Currency::USD,
        }
    }
}

impl PricingConfig {
    /// Build and validate a config from the three pricing values
    pub fn new(
        tax_rate: Decimal,
        free_shipping_threshold: Decimal,
        flat_shipping_fee: Decimal,
    ) -> CartResult<Self> {
        let config = Self {
            tax_rate,
            free_shipping_threshold,
            flat_shipping_fee,
            currency: Currency::USD,
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder: set currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Parse from a TOML string and validate
    pub fn from_toml(toml_str: &str) -> CartResult<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| CartError::Configuration(format!("invalid pricing config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config/pricing.toml` (searching parent directories), falling
    /// back to defaults, then apply environment overrides.
    pub fn load() -> CartResult<Self> {
        let config_paths = [
            "config/pricing.toml",
            "../config/pricing.toml",
            "../../config/pricing.toml",
        ];

        let mut config = None;
        for path in config_paths {
            if Path::new(path).exists() {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| CartError::Configuration(format!("failed to read {}: {}", path, e)))?;
                config = Some(Self::from_toml(&content)?);
                info!("Loaded pricing config from {}", path);
                break;
            }
        }

        let config = config.unwrap_or_else(|| {
            warn!("No pricing config found, using defaults");
            Self::default()
        });

        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `CART_TAX_RATE`, `CART_FREE_SHIPPING_THRESHOLD` and
    /// `CART_FLAT_SHIPPING_FEE` from `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> CartResult<Self> {
        if let Some(v) = lookup("CART_TAX_RATE") {
            self.tax_rate = parse_decimal("CART_TAX_RATE", &v)?;
        }
        if let Some(v) = lookup("CART_FREE_SHIPPING_THRESHOLD") {
            self.free_shipping_threshold = parse_decimal("CART_FREE_SHIPPING_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("CART_FLAT_SHIPPING_FEE") {
            self.flat_shipping_fee = parse_decimal("CART_FLAT_SHIPPING_FEE", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// All three pricing values must be non-negative
    pub fn validate(&self) -> CartResult<()> {
        for (name, value) in [
            ("tax_rate", self.tax_rate),
            ("free_shipping_threshold", self.free_shipping_threshold),
            ("flat_shipping_fee", self.flat_shipping_fee),
        ] {
            if value < Decimal::ZERO {
                return Err(CartError::Configuration(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Shipping owed for a given subtotal. Only a subtotal strictly above
    /// the threshold ships free.
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if ships_free(subtotal, self.free_shipping_threshold) {
            Decimal::ZERO
        } else {
            self.flat_shipping_fee
        }
    }
}

fn ships_free(subtotal: Decimal, threshold: Decimal) -> bool {
    subtotal > threshold
}

fn overflow(what: &str) -> CartError {
    CartError::AmountOverflow(format!("cart {}", what))
}

fn parse_decimal(key: &str, value: &str) -> CartResult<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| CartError::Configuration(format!("{}={:?} is not a decimal: {}", key, value, e)))
}

/// Price breakdown derived from the cart's items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    /// Sum of quantities, not the number of rows
    pub item_count: u64,
    /// Threshold the shipping decision was made against
    pub free_shipping_threshold: Decimal,
    pub currency: Currency,
}

impl CartSummary {
    /// Compute the summary for `items` under `config`.
    ///
    /// Fails with [`CartError::AmountOverflow`] when an amount does not fit
    /// in a `Decimal`.
    pub fn compute(items: &[LineItem], config: &PricingConfig) -> CartResult<Self> {
        let mut subtotal = Decimal::ZERO;
        let mut item_count = 0u64;
        for item in items {
            subtotal = subtotal
                .checked_add(item.line_total()?)
                .ok_or_else(|| overflow("subtotal"))?;
            item_count += u64::from(item.quantity);
        }
        let tax = subtotal
            .checked_mul(config.tax_rate)
            .ok_or_else(|| overflow("tax"))?;
        let shipping = config.shipping_for(subtotal);
        let total = subtotal
            .checked_add(tax)
            .and_then(|t| t.checked_add(shipping))
            .ok_or_else(|| overflow("total"))?;

        trace!(%subtotal, %tax, %shipping, %total, item_count, "computed cart summary");

        Ok(Self {
            subtotal,
            tax,
            shipping,
            total,
            item_count,
            free_shipping_threshold: config.free_shipping_threshold,
            currency: config.currency,
        })
    }

    /// Copy with every monetary field rounded to the currency's minor unit.
    pub fn rounded(&self) -> Self {
        let c = self.currency;
        Self {
            subtotal: c.round(self.subtotal),
            tax: c.round(self.tax),
            shipping: c.round(self.shipping),
            total: c.round(self.total),
            ..self.clone()
        }
    }

    /// Whether the subtotal cleared the threshold. A zero flat fee does
    /// not count as free shipping.
    pub fn is_free_shipping(&self) -> bool {
        ships_free(self.subtotal, self.free_shipping_threshold)
    }

    /// How much more must be spent before shipping is waived.
    ///
    /// `None` once shipping is free. At exactly the threshold this is zero:
    /// the subtotal still has to rise above it.
    pub fn amount_until_free_shipping(&self) -> Option<Decimal> {
        if self.is_free_shipping() {
            None
        } else {
            Some((self.free_shipping_threshold - self.subtotal).max(Decimal::ZERO))
        }
    }

    /// Display strings for each monetary field
    pub fn display(&self) -> SummaryDisplay {
        let c = self.currency;
        SummaryDisplay {
            subtotal: c.format(self.subtotal),
            tax: c.format(self.tax),
            shipping: if self.is_free_shipping() {
                "Free".to_string()
            } else {
                c.format(self.shipping)
            },
            total: c.format(self.total),
            free_shipping_hint: self
                .amount_until_free_shipping()
                .map(|gap| format!("Add {} more for free shipping!", c.format(gap))),
        }
    }
}

/// Formatted summary for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDisplay {
    pub subtotal: String,
    pub tax: String,
    pub shipping: String,
    pub total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_shipping_hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, price: Decimal, quantity: u32) -> LineItem {
        LineItem::new(id, format!("item-{}", id), price, quantity).unwrap()
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::compute(&[], &PricingConfig::default()).unwrap();
        assert_eq!(summary.subtotal, Decimal::ZERO);
        assert_eq!(summary.tax, Decimal::ZERO);
        assert_eq!(summary.shipping, Decimal::new(15, 0));
        assert_eq!(summary.total, Decimal::new(15, 0));
        assert_eq!(summary.item_count, 0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let config = PricingConfig::default();
        assert_eq!(config.shipping_for(Decimal::new(100, 0)), Decimal::new(15, 0));
        assert_eq!(config.shipping_for(Decimal::new(10001, 2)), Decimal::ZERO);
    }

    #[test]
    fn test_accumulates_before_rounding() {
        // 3 × 0.333 = 0.999, taxed at 8% = 0.07992; rounding per line would drift
        let items = vec![
            item(1, Decimal::new(333, 3), 1),
            item(2, Decimal::new(333, 3), 1),
            item(3, Decimal::new(333, 3), 1),
        ];
        let summary = CartSummary::compute(&items, &PricingConfig::default()).unwrap();
        assert_eq!(summary.subtotal, Decimal::new(999, 3));
        assert_eq!(summary.tax, Decimal::new(7992, 5));

        let rounded = summary.rounded();
        assert_eq!(rounded.subtotal, Decimal::new(100, 2));
        assert_eq!(rounded.tax, Decimal::new(8, 2));
        assert_eq!(rounded.total, Decimal::new(1608, 2));
    }

    #[test]
    fn test_free_shipping_hint() {
        let config = PricingConfig::default();

        let below = CartSummary::compute(&[item(1, Decimal::new(40, 0), 1)], &config).unwrap();
        assert_eq!(below.amount_until_free_shipping(), Some(Decimal::new(60, 0)));
        assert_eq!(
            below.display().free_shipping_hint.as_deref(),
            Some("Add $60.00 more for free shipping!")
        );

        let at = CartSummary::compute(&[item(1, Decimal::new(50, 0), 2)], &config).unwrap();
        assert_eq!(at.amount_until_free_shipping(), Some(Decimal::ZERO));

        let above = CartSummary::compute(&[item(1, Decimal::new(60, 0), 2)], &config).unwrap();
        assert_eq!(above.amount_until_free_shipping(), None);
        assert_eq!(above.display().shipping, "Free");
    }

    #[test]
    fn test_zero_fee_is_not_free_shipping() {
        let config = PricingConfig::new(Decimal::new(8, 2), Decimal::new(100, 0), Decimal::ZERO).unwrap();
        let summary = CartSummary::compute(&[item(1, Decimal::new(40, 0), 1)], &config).unwrap();

        assert_eq!(summary.shipping, Decimal::ZERO);
        assert!(!summary.is_free_shipping());
        let display = summary.display();
        assert_eq!(display.shipping, "$0.00");
        assert_eq!(
            display.free_shipping_hint.as_deref(),
            Some("Add $60.00 more for free shipping!")
        );
    }

    #[test]
    fn test_overflowing_total_is_an_error() {
        // Fits as a subtotal, but not once tax is added
        let price = Decimal::from_i128_with_scale(75 * 10i128.pow(27), 0);
        let err = CartSummary::compute(&[item(1, price, 1)], &PricingConfig::default()).unwrap_err();
        assert!(matches!(err, CartError::AmountOverflow(_)));

        let mut unchecked = item(2, price, 1);
        unchecked.quantity = 2;
        let err = CartSummary::compute(&[unchecked], &PricingConfig::default()).unwrap_err();
        assert!(matches!(err, CartError::AmountOverflow(_)));
    }

    #[test]
    fn test_new_validates() {
        let err = PricingConfig::new(Decimal::new(-1, 2), Decimal::new(100, 0), Decimal::new(15, 0))
            .unwrap_err();
        assert!(matches!(err, CartError::Configuration(_)));
        assert!(PricingConfig::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = PricingConfig::from_toml("tax_rate = 0.16\ncurrency = \"kes\"\n").unwrap();
        assert_eq!(config.tax_rate, Decimal::new(16, 2));
        assert_eq!(config.free_shipping_threshold, Decimal::new(100, 0));
        assert_eq!(config.currency, Currency::KES);
    }

    #[test]
    fn test_from_toml_rejects_negative_fee() {
        let err = PricingConfig::from_toml("flat_shipping_fee = -5").unwrap_err();
        assert!(matches!(err, CartError::Configuration(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = PricingConfig::default()
            .with_env_overrides(|key| match key {
                "CART_TAX_RATE" => Some("0.1".to_string()),
                "CART_FLAT_SHIPPING_FEE" => Some(" 9.50 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.tax_rate, Decimal::new(1, 1));
        assert_eq!(config.flat_shipping_fee, Decimal::new(95, 1));
        assert_eq!(config.free_shipping_threshold, Decimal::new(100, 0));

        let err = PricingConfig::default()
            .with_env_overrides(|key| (key == "CART_TAX_RATE").then(|| "eight".to_string()))
            .unwrap_err();
        assert!(matches!(err, CartError::Configuration(_)));
    }
}
