//! Cross-category combo pairing: one drink plus one food item for a fixed
//! combo price, driven by a lookup table of price tiers.
//!
//! ## Table Walk
//! ```text
//!   entry 1: drink/39 × food/39 → 39     drinks ▼ (price desc)   foods ▼
//!   entry 2: drink/49 × food/59 → 49       d0 ─────────────────── f0
//!   entry 3: drink/49 × food/49 → 49       d1 ─────────────────── f1
//!   ...                                    d2        (no food, unpaired)
//! ```
//! Entries are tried in table order, so the table *is* the tier
//! preference. An item consumed by an earlier entry is skipped by later
//! entries of the same call; it is still visible to later rules unless the
//! rule is exclusive.

use std::collections::BTreeSet;

use tracing::trace;

use crate::money::Money;
use crate::rules::{CartView, Rule, RuleMeta};
use crate::types::{DiscountRecord, RuleId};

/// One row of the combo table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboEntry {
    pub drink_tag: String,
    pub food_tag: String,
    pub combo_price: Money,
}

impl ComboEntry {
    pub fn new(drink_tag: impl Into<String>, food_tag: impl Into<String>, combo_price: Money) -> Self {
        ComboEntry {
            drink_tag: drink_tag.into(),
            food_tag: food_tag.into(),
            combo_price,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComboDiscount {
    meta: RuleMeta,
    entries: Vec<ComboEntry>,
}

impl ComboDiscount {
    pub fn new(id: RuleId, name: impl Into<String>, entries: Vec<ComboEntry>) -> Self {
        ComboDiscount {
            meta: RuleMeta::new(id, name),
            entries,
        }
    }

    /// Builds a table over hierarchical tags `"{prefix}/{tier}/{category}"`.
    ///
    /// ```rust
    /// use tally_core::rules::ComboDiscount;
    /// use tally_core::RuleId;
    ///
    /// let rule = ComboDiscount::tiered(RuleId(1), "combo", "drink", "food", &[(39, 59, 59)]);
    /// assert_eq!(rule.entries()[0].drink_tag, "combo/39/drink");
    /// assert_eq!(rule.entries()[0].food_tag, "combo/59/food");
    /// ```
    pub fn tiered(
        id: RuleId,
        prefix: &str,
        drink_label: &str,
        food_label: &str,
        tiers: &[(i64, i64, i64)],
    ) -> Self {
        let entries = tiers
            .iter()
            .map(|(drink, food, price)| {
                ComboEntry::new(
                    format!("{prefix}/{drink}/{drink_label}"),
                    format!("{prefix}/{food}/{food_label}"),
                    Money::from_units(*price),
                )
            })
            .collect();
        ComboDiscount::new(id, prefix, entries)
    }

    pub fn entries(&self) -> &[ComboEntry] {
        &self.entries
    }

    fn ranked(&self, view: &CartView<'_>, tag: &str, consumed: &BTreeSet<usize>) -> Vec<usize> {
        let mut found: Vec<usize> = view
            .visible_tagged(tag)
            .map(|(index, _)| index)
            .filter(|index| !consumed.contains(index))
            .collect();
        view.sort_by_net_price_desc(&mut found);
        found
    }
}

impl Rule for ComboDiscount {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn process(&self, view: &CartView<'_>) -> Vec<DiscountRecord> {
        let mut consumed = BTreeSet::new();
        let mut records = Vec::new();

        for entry in &self.entries {
            let drinks = self.ranked(view, &entry.drink_tag, &consumed);
            let foods: Vec<usize> = self
                .ranked(view, &entry.food_tag, &consumed)
                .into_iter()
                .filter(|index| !drinks.contains(index))
                .collect();

            for (&drink, &food) in drinks.iter().zip(&foods) {
                consumed.insert(drink);
                consumed.insert(food);

                let drink_net = view.net_price(drink);
                let food_net = view.net_price(food);
                let amount = drink_net + food_net - entry.combo_price;

                // food goes free first, the drink absorbs the rest
                let food_off = if amount.is_negative() {
                    amount
                } else {
                    amount.min(food_net)
                };
                let drink_off = amount - food_off;
                trace!(
                    drink = %entry.drink_tag,
                    food = %entry.food_tag,
                    %amount,
                    "Combo paired"
                );

                records.push(
                    self.meta
                        .record(view.matched(&[drink, food], &[drink_off, food_off])),
                );
            }
        }

        records
    }
}
