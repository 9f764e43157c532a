//! # Domain Types
//!
//! Core domain types shared by the cart, the rules and the checkout engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ProductRecord  │──►│      Item       │◄──│  MatchedItem    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  loader input   │   │  id, sku, name  │   │  index, item_id │       │
//! │  │  (may be        │   │  unit_price     │   │  allocated      │       │
//! │  │   malformed)    │   │  tags           │   └────────┬────────┘       │
//! │  └─────────────────┘   │  discount   ◄─┐ │            │                │
//! │                        │  exclusions ◄─┤ │   ┌────────▼────────┐       │
//! │                        │  notes      ◄─┘ │   │ DiscountRecord  │       │
//! │                        └─────────────────┘   │  rule: RuleInfo │       │
//! │                          per-run state,      │  items, amount  │       │
//! │                          orchestrator only   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product Record (loader input)
// =============================================================================

/// A product as supplied by the external loader.
///
/// `price_cents` and `tags` are optional on purpose: a loader that drops
/// them produces a *malformed* record which `Cart::from_products` rejects
/// before any rule runs, instead of a deserialization failure far away from
/// the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRecord {
    /// Item id. When absent the 1-based position in the list is used.
    #[serde(default)]
    pub id: Option<u32>,

    /// Stock Keeping Unit. Repeats across records for multiple units.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Unit price in cents.
    #[serde(default)]
    pub price_cents: Option<i64>,

    /// Discount carried in from upstream. Validated, then reset per run.
    #[serde(default)]
    pub discount_cents: i64,

    /// Category tags, possibly hierarchical (`"combo/39/drink"`).
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,
}

impl ProductRecord {
    /// Convenience constructor for a well-formed record.
    pub fn new<I, T>(sku: &str, name: &str, price_cents: i64, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        ProductRecord {
            id: None,
            sku: sku.to_string(),
            name: name.to_string(),
            price_cents: Some(price_cents),
            discount_cents: 0,
            tags: Some(tags.into_iter().map(Into::into).collect()),
        }
    }

    /// Sets an explicit id.
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }
}

// =============================================================================
// Item
// =============================================================================

/// A product line in the cart.
///
/// Identity, price and tags are fixed once the cart is built. The per-run
/// state (`discount`, `exclusions`, `notes`) has no public setter: only the
/// checkout engine mutates it, through the crate-private methods below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub tags: BTreeSet<String>,
    discount: Money,
    exclusions: BTreeSet<String>,
    notes: Vec<String>,
}

impl Item {
    /// Creates a fresh item with no discount applied.
    pub fn new<I, T>(id: u32, sku: &str, name: &str, unit_price: Money, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Item {
            id,
            sku: sku.to_string(),
            name: name.to_string(),
            unit_price,
            tags: tags.into_iter().map(Into::into).collect(),
            discount: Money::zero(),
            exclusions: BTreeSet::new(),
            notes: Vec::new(),
        }
    }

    /// Discount applied so far in the current run.
    #[inline]
    pub fn discount(&self) -> Money {
        self.discount
    }

    /// Unit price minus discount applied so far.
    #[inline]
    pub fn net_price(&self) -> Money {
        self.unit_price - self.discount
    }

    #[inline]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Exclusivity tags this item received in the current run.
    pub fn exclusions(&self) -> &BTreeSet<String> {
        &self.exclusions
    }

    /// True while no exclusive rule has claimed the item in this run.
    #[inline]
    pub fn is_eligible(&self) -> bool {
        self.exclusions.is_empty()
    }

    /// Notes of every rule that touched the item, in application order.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub(crate) fn reset(&mut self) {
        self.discount = Money::zero();
        self.exclusions.clear();
        self.notes.clear();
    }

    pub(crate) fn debit(&mut self, amount: Money) {
        self.discount += amount;
    }

    pub(crate) fn exclude(&mut self, tag: &str) {
        self.exclusions.insert(tag.to_string());
    }

    pub(crate) fn add_note(&mut self, note: &str) {
        if !note.is_empty() && !self.notes.iter().any(|n| n == note) {
            self.notes.push(note.to_string());
        }
    }
}

// =============================================================================
// Rule Identity
// =============================================================================

/// Identifier of a rule within one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RuleId(pub u32);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a discount record says about the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RuleInfo {
    pub id: RuleId,
    /// Display name ("任 2 箱結帳 88 折!").
    pub name: String,
    /// Short description, also appended to item notes.
    pub note: String,
}

impl RuleInfo {
    pub fn new(id: RuleId, name: impl Into<String>) -> Self {
        RuleInfo {
            id,
            name: name.into(),
            note: String::new(),
        }
    }
}

// =============================================================================
// Discount Record
// =============================================================================

/// One matched item inside a discount record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchedItem {
    /// Position of the item in the cart.
    pub index: usize,
    pub item_id: u32,
    /// Portion of the record amount debited from this item.
    pub allocated: Money,
}

/// The output of one rule match.
///
/// `amount` equals the sum of `items[..].allocated`; the engine recomputes
/// it after validation so the two can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRecord {
    pub rule: RuleInfo,
    pub items: Vec<MatchedItem>,
    pub amount: Money,
    /// Exclusivity tag applied to every matched item when this record lands.
    pub exclusive_tag: Option<String>,
}

impl DiscountRecord {
    /// Builds a record from `(cart index, item id, allocation)` triples.
    pub fn new(rule: RuleInfo, exclusive_tag: Option<&str>, items: Vec<MatchedItem>) -> Self {
        let amount = items.iter().map(|m| m.allocated).sum();
        DiscountRecord {
            rule,
            items,
            amount,
            exclusive_tag: exclusive_tag.map(str::to_string),
        }
    }

    /// Ids of the matched items, in match order.
    pub fn item_ids(&self) -> Vec<u32> {
        self.items.iter().map(|m| m.item_id).collect()
    }

    pub(crate) fn recompute_amount(&mut self) {
        self.amount = self.items.iter().map(|m| m.allocated).sum();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_net_price_tracks_discount() {
        let mut item = Item::new(1, "COKE", "Coke", Money::from_units(65), ["drink"]);
        assert_eq!(item.net_price(), Money::from_units(65));

        item.debit(Money::from_units(15));
        assert_eq!(item.discount(), Money::from_units(15));
        assert_eq!(item.net_price(), Money::from_units(50));
    }

    #[test]
    fn test_item_reset_clears_run_state() {
        let mut item = Item::new(1, "COKE", "Coke", Money::from_units(65), ["drink"]);
        item.debit(Money::from_units(5));
        item.exclude("bundle");
        item.add_note("88折");
        assert!(!item.is_eligible());

        item.reset();
        assert_eq!(item.discount(), Money::zero());
        assert!(item.is_eligible());
        assert!(item.notes().is_empty());
        assert!(item.has_tag("drink"));
    }

    #[test]
    fn test_item_notes_are_deduplicated() {
        let mut item = Item::new(1, "A", "A", Money::from_units(1), Vec::<String>::new());
        item.add_note("加10元多一件");
        item.add_note("加10元多一件");
        item.add_note("");
        assert_eq!(item.notes(), ["加10元多一件".to_string()]);
    }

    #[test]
    fn test_record_amount_is_sum_of_allocations() {
        let record = DiscountRecord::new(
            RuleInfo::new(RuleId(1), "pair"),
            Some("pair"),
            vec![
                MatchedItem { index: 0, item_id: 1, allocated: Money::zero() },
                MatchedItem { index: 1, item_id: 2, allocated: Money::from_units(40) },
            ],
        );
        assert_eq!(record.amount, Money::from_units(40));
        assert_eq!(record.item_ids(), vec![1, 2]);
        assert_eq!(record.exclusive_tag.as_deref(), Some("pair"));
    }

    #[test]
    fn test_product_record_deserializes_missing_fields_as_none() {
        let json = r#"{"sku":"X","name":"Thing"}"#;
        let record: ProductRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.price_cents, None);
        assert_eq!(record.tags, None);
        assert_eq!(record.discount_cents, 0);
    }
}
