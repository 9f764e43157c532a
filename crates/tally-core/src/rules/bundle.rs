//! Fixed-bundle discount: "any N for X% off" or "every N for X off".

use crate::money::{DiscountRate, Money};
use crate::rules::{complete_groups, CartView, Rule, RuleMeta};
use crate::types::{DiscountRecord, RuleId};

/// What one completed bundle earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reward {
    /// Percentage of the bundle's net value.
    Percent(DiscountRate),
    /// Fixed amount per bundle, spread over the bundle by net price.
    Amount(Money),
}

/// Buffers visible items in cart order; every time the buffer reaches
/// `size` it becomes one discount record and the buffer starts over.
/// Leftovers smaller than `size` are not discounted.
///
/// Without a tag every visible item counts. With `min_total` a completed
/// bundle whose net value is below the minimum earns nothing (the buffer
/// still resets).
#[derive(Debug, Clone)]
pub struct BundleDiscount {
    meta: RuleMeta,
    size: usize,
    reward: Reward,
    tag: Option<String>,
    min_total: Option<Money>,
}

impl BundleDiscount {
    pub fn new(id: RuleId, size: usize, reward: Reward) -> Self {
        let name = match reward {
            Reward::Percent(rate) => format!("Any {size} for {rate} off"),
            Reward::Amount(amount) => format!("Every {size} for {amount} off"),
        };
        BundleDiscount {
            meta: RuleMeta::new(id, name),
            size,
            reward,
            tag: None,
            min_total: None,
        }
    }

    /// Only items with `tag` fill the buffer.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_min_total(mut self, min_total: Money) -> Self {
        self.min_total = Some(min_total);
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn reward(&self) -> Reward {
        self.reward
    }
}

impl Rule for BundleDiscount {
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
        if self.size == 0 {
            return Vec::new();
        }

        let visible: Vec<usize> = view
            .visible_matching(self.tag.as_deref())
            .map(|(index, _)| index)
            .collect();

        complete_groups(&visible, self.size)
            .filter_map(|bundle| {
                let value = view.net_total_of(bundle);
                if self.min_total.is_some_and(|min| value < min) {
                    return None;
                }
                let amount = match self.reward {
                    Reward::Percent(rate) => value.percent_of(rate),
                    Reward::Amount(amount) => amount,
                };
                Some(self.meta.record(view.matched_proportional(bundle, amount)))
            })
            .collect()
    }
}
