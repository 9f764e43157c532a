//! # Cart
//!
//! The mutable state a checkout run works on.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  loader ──► Cart::from_products()          (items created once)        │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  CheckoutEngine::checkout(&mut cart)       (only writer during a run)  │
//! │     │  reset() ─► apply(record) ... ─► set_total()                     │
//! │     │                                                                   │
//! │     └──► CartView<'_>  (read-only, handed to each rule)                │
//! │                                                                         │
//! │  caller reads items(), discounts(), total() afterwards                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountRecord, Item, ProductRecord};
use crate::validation::validate_product;
use crate::MAX_CART_ITEMS;

/// Items in insertion order, the discounts applied by the last run and the
/// resulting total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<Item>,
    discounts: Vec<DiscountRecord>,
    total: Money,
}

impl Cart {
    /// Creates a cart from ready-made items. The total starts at the
    /// undiscounted subtotal.
    ///
    /// Prices are not validated here; out-of-range prices are rejected
    /// when a checkout run starts.
    pub fn new(items: Vec<Item>) -> Self {
        let mut cart = Cart {
            items,
            discounts: Vec::new(),
            total: Money::zero(),
        };
        cart.total = cart.subtotal();
        cart
    }

    /// Builds a cart from loader records.
    ///
    /// Every record is validated before any item is built; the first
    /// malformed record fails the whole call. Records without an id get
    /// their 1-based position.
    ///
    /// ```rust
    /// use tally_core::{Cart, ProductRecord};
    ///
    /// let cart = Cart::from_products(vec![
    ///     ProductRecord::new("TEA", "Green Tea", 2500, ["drink"]),
    ///     ProductRecord::new("TEA", "Green Tea", 2500, ["drink"]),
    /// ])
    /// .unwrap();
    /// assert_eq!(cart.len(), 2);
    /// assert_eq!(cart.items()[1].id, 2);
    /// ```
    pub fn from_products(records: Vec<ProductRecord>) -> CoreResult<Self> {
        if records.len() > MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        for (position, record) in records.iter().enumerate() {
            validate_product(record).map_err(|source| CoreError::MalformedItem {
                position,
                sku: record.sku.clone(),
                source,
            })?;
        }

        let mut seen = BTreeSet::new();
        let mut items = Vec::with_capacity(records.len());
        for (position, record) in records.into_iter().enumerate() {
            let id = record.id.unwrap_or(position as u32 + 1);
            if !seen.insert(id) {
                return Err(CoreError::DuplicateItemId(id));
            }
            // validated above: price and tags are present
            let price = Money::from_cents(record.price_cents.unwrap_or_default());
            let tags = record.tags.unwrap_or_default();
            items.push(Item::new(id, &record.sku, &record.name, price, tags));
        }

        Ok(Cart::new(items))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Discount records of the most recent run, in application order.
    pub fn discounts(&self) -> &[DiscountRecord] {
        &self.discounts
    }

    /// Total after the most recent run.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Σ unit prices, saturating at the `i64` bounds.
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, item| acc.saturating_add(item.unit_price))
    }

    /// Σ discount record amounts.
    pub fn discount_total(&self) -> Money {
        self.discounts.iter().map(|d| d.amount).sum()
    }

    /// Σ (unit price − item discount).
    pub fn net_total(&self) -> Money {
        self.items.iter().map(|i| i.net_price()).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // =========================================================================
    // Engine-only mutation
    // =========================================================================

    #[cfg(test)]
    pub(crate) fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    /// Clears the previous run: records, item discounts, exclusions, notes.
    pub(crate) fn reset(&mut self) {
        self.discounts.clear();
        for item in &mut self.items {
            item.reset();
        }
        self.total = self.subtotal();
    }

    /// Debits a validated record from its items and appends it.
    pub(crate) fn apply(&mut self, record: DiscountRecord) {
        for matched in &record.items {
            if let Some(item) = self.items.get_mut(matched.index) {
                item.debit(matched.allocated);
                item.add_note(&record.rule.note);
                if let Some(tag) = &record.exclusive_tag {
                    item.exclude(tag);
                }
            }
        }
        self.discounts.push(record);
    }

    /// Tags every item of `record` with `tag`. Used for the running rule's
    /// own exclusivity, which a compound rule's sub-records don't carry.
    pub(crate) fn exclude(&mut self, record: &DiscountRecord, tag: &str) {
        for matched in &record.items {
            if let Some(item) = self.items.get_mut(matched.index) {
                item.exclude(tag);
            }
        }
    }

    pub(crate) fn set_total(&mut self, total: Money) {
        self.total = total;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
