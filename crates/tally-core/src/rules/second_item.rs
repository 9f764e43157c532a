//! Paired percent-off: the second of every two tagged items is X% off.

use crate::money::{DiscountRate, Money};
use crate::rules::{complete_groups, CartView, Rule, RuleMeta};
use crate::types::{DiscountRecord, RuleId};

/// Pairs visible tagged items in cart order. Both items are matched, only
/// the second one is discounted.
#[derive(Debug, Clone)]
pub struct SecondItemDiscount {
    meta: RuleMeta,
    tag: String,
    rate: DiscountRate,
}

impl SecondItemDiscount {
    pub fn new(id: RuleId, tag: impl Into<String>, rate: DiscountRate) -> Self {
        let tag = tag.into();
        SecondItemDiscount {
            meta: RuleMeta::new(id, format!("{tag}: second item {rate} off")),
            tag,
            rate,
        }
    }
}

impl Rule for SecondItemDiscount {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn target_tag(&self) -> Option<&str> {
        Some(&self.tag)
    }

    fn process(&self, view: &CartView<'_>) -> Vec<DiscountRecord> {
        let matched: Vec<usize> = view.visible_tagged(&self.tag).map(|(i, _)| i).collect();

        complete_groups(&matched, 2)
            .map(|pair| {
                let off = view.net_price(pair[1]).percent_of(self.rate);
                self.meta.record(view.matched(pair, &[Money::zero(), off]))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::types::Item;

    #[test]
    fn test_only_second_item_discounted() {
        let cart = Cart::new(vec![
            Item::new(1, "A", "Tea", Money::from_units(80), ["tea"]),
            Item::new(2, "B", "Cake", Money::from_units(90), ["cake"]),
            Item::new(3, "C", "Tea", Money::from_units(60), ["tea"]),
            Item::new(4, "D", "Tea", Money::from_units(70), ["tea"]),
        ]);
        let rule = SecondItemDiscount::new(RuleId(1), "tea", DiscountRate::from_percent(50));
        let records = rule.process(&CartView::new(&cart));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item_ids(), vec![1, 3]);
        // 50% of the second item (60), not of the pair
        assert_eq!(records[0].amount, Money::from_units(30));
        assert_eq!(records[0].items[0].allocated, Money::zero());
    }

    #[test]
    fn test_single_item_no_pair() {
        let cart = Cart::new(vec![Item::new(1, "A", "Tea", Money::from_units(80), ["tea"])]);
        let rule = SecondItemDiscount::new(RuleId(1), "tea", DiscountRate::from_percent(50));
        assert!(rule.process(&CartView::new(&cart)).is_empty());
    }
}
