//! # Cart
//!
//! The cart engine: an ordered collection of line items, one row per
//! variant key, plus the pricing query over them.
//!
//! Every mutation either applies in full or leaves the cart untouched.
//! Removing or re-quantifying a variant that is not in the cart is a no-op.

use crate::error::{CartError, CartResult};
use crate::item::{LineItem, VariantKey};
use crate::pricing::{CartSummary, PricingConfig};
use rust_decimal::Decimal;
use tracing::debug;

/// What an add did to the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was appended
    Inserted,
    /// An existing row's quantity grew to the given value
    Merged { quantity: u32 },
}

/// A shopping cart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart by adding each item in order, merging duplicates.
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> CartResult<Self> {
        let mut cart = Self::new();
        for item in items {
            cart.add_or_merge(item)?;
        }
        Ok(cart)
    }

    /// Add an item, or grow the quantity of the row with the same variant key.
    ///
    /// Rejects `price < 0`, `quantity < 1`, and any add whose line total or
    /// resulting subtotal does not fit in a `Decimal`. On a merge the
    /// existing row keeps its name, price and attributes. Blank size/color
    /// are stored as absent.
    pub fn add_or_merge(&mut self, item: LineItem) -> CartResult<AddOutcome> {
        item.validate()?;
        let item = item.normalized();

        let key = item.variant_key();
        if let Some(index) = self.position(&key) {
            let existing = &self.items[index];
            let quantity = existing
                .quantity
                .checked_add(item.quantity)
                .ok_or_else(|| CartError::QuantityOverflow {
                    product_id: key.id.to_string(),
                })?;
            self.ensure_amounts_fit(Some(index), existing.price, quantity, &key)?;

            self.items[index].quantity = quantity;
            debug!(variant = %key, quantity, "merged cart item");
            return Ok(AddOutcome::Merged { quantity });
        }

        self.ensure_amounts_fit(None, item.price, item.quantity, &key)?;
        debug!(variant = %key, quantity = item.quantity, "inserted cart item");
        self.items.push(item);
        Ok(AddOutcome::Inserted)
    }

    /// Set a row's quantity directly.
    ///
    /// `quantity < 1` removes the row. Returns whether a row matched; fails
    /// without change if the new amounts do not fit in a `Decimal`.
    pub fn set_quantity(&mut self, key: &VariantKey, quantity: i64) -> CartResult<bool> {
        if quantity < 1 {
            return Ok(self.remove(key));
        }
        // Quantities beyond u32 saturate rather than wrap.
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let Some(index) = self.position(key) else {
            return Ok(false);
        };
        self.ensure_amounts_fit(Some(index), self.items[index].price, quantity, key)?;

        self.items[index].quantity = quantity;
        debug!(variant = %key, quantity, "set cart item quantity");
        Ok(true)
    }

    /// Remove a row. Returns whether a row matched.
    pub fn remove(&mut self, key: &VariantKey) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| !i.matches(key));
        let removed = self.items.len() < len_before;
        if removed {
            debug!(variant = %key, "removed cart item");
        }
        removed
    }

    /// Increase a row's quantity by one (the `+` control)
    pub fn increment(&mut self, key: &VariantKey) -> CartResult<bool> {
        let Some(quantity) = self.get(key).map(|i| i.quantity) else {
            return Ok(false);
        };
        self.set_quantity(key, i64::from(quantity) + 1)
    }

    /// Decrease a row's quantity by one; a row at 1 is removed
    pub fn decrement(&mut self, key: &VariantKey) -> CartResult<bool> {
        let Some(quantity) = self.get(key).map(|i| i.quantity) else {
            return Ok(false);
        };
        self.set_quantity(key, i64::from(quantity) - 1)
    }

    /// Empty the cart
    pub fn clear(&mut self) {
        debug!(rows = self.items.len(), "cleared cart");
        self.items.clear();
    }

    /// Price summary for the current items. Does not mutate.
    pub fn summary(&self, config: &PricingConfig) -> CartResult<CartSummary> {
        CartSummary::compute(&self.items, config)
    }

    /// Rows in insertion order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, key: &VariantKey) -> Option<&LineItem> {
        self.items.iter().find(|i| i.matches(key))
    }

    pub fn contains(&self, key: &VariantKey) -> bool {
        self.get(key).is_some()
    }

    /// Sum of quantities
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Number of distinct variant rows
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, key: &VariantKey) -> Option<usize> {
        self.items.iter().position(|i| i.matches(key))
    }

    /// Fail unless the row at `index` (or a new row, for `None`) can become
    /// `price × quantity` with the cart subtotal still representable.
    fn ensure_amounts_fit(
        &self,
        index: Option<usize>,
        price: Decimal,
        quantity: u32,
        key: &VariantKey,
    ) -> CartResult<()> {
        let line_total = price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| CartError::AmountOverflow(format!("line total for {}", key)))?;

        self.items
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != index)
            .try_fold(line_total, |subtotal, (_, item)| {
                subtotal.checked_add(item.line_total().ok()?)
            })
            .map(|_| ())
            .ok_or_else(|| CartError::AmountOverflow(format!("cart subtotal with {}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn tee(quantity: u32) -> LineItem {
        LineItem::new(5u64, "Tee", Decimal::new(20, 0), quantity)
            .unwrap()
            .with_size("M")
            .with_color("red")
    }

    #[test]
    fn test_merge_sums_quantity() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_or_merge(tee(1)).unwrap(), AddOutcome::Inserted);
        assert_eq!(
            cart.add_or_merge(tee(3)).unwrap(),
            AddOutcome::Merged { quantity: 4 }
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 4);
    }

    #[test]
    fn test_merge_keeps_existing_attributes() {
        let mut cart = Cart::new();
        cart.add_or_merge(tee(1).with_brand("Zuri")).unwrap();
        cart.add_or_merge(tee(1).with_brand("Other")).unwrap();
        assert_eq!(cart.items()[0].brand.as_deref(), Some("Zuri"));
    }

    #[test]
    fn test_invalid_add_leaves_cart_untouched() {
        let mut cart = Cart::from_items([tee(2)]).unwrap();
        let before = cart.clone();

        let mut bad = tee(1);
        bad.quantity = 0;
        assert!(cart.add_or_merge(bad).is_err());

        let mut negative = tee(1);
        negative.price = Decimal::new(-5, 0);
        assert!(cart.add_or_merge(negative).is_err());

        assert_eq!(cart, before);
    }

    #[test]
    fn test_overflow_is_rejected_atomically() {
        let mut cart = Cart::from_items([tee(u32::MAX)]).unwrap();
        let err = cart.add_or_merge(tee(1)).unwrap_err();
        assert!(matches!(err, CartError::QuantityOverflow { .. }));
        assert_eq!(cart.items()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_set_quantity_replaces() {
        let mut cart = Cart::from_items([tee(2)]).unwrap();
        let key = tee(1).variant_key();
        assert!(cart.set_quantity(&key, 7).unwrap());
        assert_eq!(cart.get(&key).map(|i| i.quantity), Some(7));
    }

    #[test]
    fn test_set_quantity_below_one_removes() {
        let mut cart = Cart::from_items([tee(2)]).unwrap();
        let key = tee(1).variant_key();
        assert!(cart.set_quantity(&key, -3).unwrap());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_missing_key_is_noop() {
        let mut cart = Cart::from_items([tee(2)]).unwrap();
        let before = cart.clone();
        let other = VariantKey::new(5u64).with_size("L").with_color("red");

        assert!(!cart.set_quantity(&other, 4).unwrap());
        assert!(!cart.set_quantity(&other, 0).unwrap());
        assert!(!cart.remove(&other));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = Cart::from_items([tee(1)]).unwrap();
        let key = tee(1).variant_key();

        assert!(cart.increment(&key).unwrap());
        assert_eq!(cart.item_count(), 2);
        assert!(cart.decrement(&key).unwrap());
        assert!(cart.decrement(&key).unwrap());
        assert!(!cart.contains(&key));
        assert!(!cart.decrement(&key).unwrap());
    }

    #[test]
    fn test_item_count_vs_rows() {
        let mut cart = Cart::new();
        cart.add_or_merge(tee(2)).unwrap();
        cart.add_or_merge(tee(1).with_size("L")).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_amount_overflow_is_rejected_atomically() {
        let huge = Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0);
        let big = |id: u64| LineItem::new(id, "Yacht", huge, 1).unwrap();
        let mut cart = Cart::from_items([big(1)]).unwrap();
        let before = cart.clone();

        // Merging doubles the line total past Decimal::MAX
        let err = cart.add_or_merge(big(1)).unwrap_err();
        assert!(matches!(err, CartError::AmountOverflow(_)));

        // A second row pushes the subtotal past it
        let err = cart.add_or_merge(big(2)).unwrap_err();
        assert!(matches!(err, CartError::AmountOverflow(_)));

        // Raising the quantity directly is guarded the same way
        let key = VariantKey::new(1u64);
        assert!(matches!(cart.set_quantity(&key, 2), Err(CartError::AmountOverflow(_))));
        assert!(matches!(cart.increment(&key), Err(CartError::AmountOverflow(_))));

        assert_eq!(cart, before);
        assert_eq!(cart.summary(&PricingConfig::default()).unwrap().subtotal, huge);
    }

    #[test]
    fn test_blank_attributes_match_absent_ones() {
        let mut cart = Cart::new();
        let blank = LineItem::new(3u64, "Cap", Decimal::new(12, 0), 1)
            .unwrap()
            .with_size("")
            .with_color(" ");
        cart.add_or_merge(blank.clone()).unwrap();
        assert_eq!(cart.items()[0].size, None);
        assert_eq!(cart.items()[0].color, None);

        assert_eq!(
            cart.add_or_merge(blank).unwrap(),
            AddOutcome::Merged { quantity: 2 }
        );
        assert!(cart.set_quantity(&VariantKey::new(3u64).with_size(""), 5).unwrap());
        assert!(cart.remove(&VariantKey::new(3u64).with_color("")));
        assert!(cart.is_empty());
    }
}
