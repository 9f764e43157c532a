//! Threshold discount: spend more than X, get Y off.

use crate::money::Money;
use crate::rules::{CartView, Rule, RuleMeta};
use crate::types::{DiscountRecord, RuleId};

/// One flat discount when the visible net total exceeds `min_total`.
/// A total exactly at the minimum does not qualify. Applies at most once
/// per run, whatever the quantity.
#[derive(Debug, Clone)]
pub struct ThresholdDiscount {
    meta: RuleMeta,
    min_total: Money,
    amount: Money,
    tag: Option<String>,
}

impl ThresholdDiscount {
    pub fn new(id: RuleId, min_total: Money, amount: Money) -> Self {
        ThresholdDiscount {
            meta: RuleMeta::new(id, format!("Spend {min_total}, save {amount}")),
            min_total,
            amount,
            tag: None,
        }
    }

    /// Only items with `tag` count toward the threshold and share the discount.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

impl Rule for ThresholdDiscount {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn target_tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    fn process(&self, view: &CartView<'_>) -> Vec<DiscountRecord> {
        let matched: Vec<usize> = view
            .visible_matching(self.tag.as_deref())
            .map(|(index, _)| index)
            .collect();
        if matched.is_empty() {
            return Vec::new();
        }

        if view.net_total_of(&matched) <= self.min_total {
            return Vec::new();
        }

        vec![self
            .meta
            .record(view.matched_proportional(&matched, self.amount))]
    }
}
