//! Ranked pair-percent discount: pairs of a tag, most expensive first.

use crate::money::DiscountRate;
use crate::rules::{complete_groups, CartView, Rule, RuleMeta};
use crate::types::{DiscountRecord, RuleId};

/// Sorts visible tagged items by descending net price (stable, so equal
/// prices keep cart order), then pairs them. Each pair gets
/// `rate × (a + b)` off, spread over the pair by net price. With an odd
/// count the cheapest item is left out.
#[derive(Debug, Clone)]
pub struct RankedPairDiscount {
    meta: RuleMeta,
    tag: String,
    rate: DiscountRate,
}

impl RankedPairDiscount {
    pub fn new(id: RuleId, tag: impl Into<String>, rate: DiscountRate) -> Self {
        let tag = tag.into();
        RankedPairDiscount {
            meta: RuleMeta::new(id, format!("Any two {tag} for {rate} off")),
            tag,
            rate,
        }
    }
}

impl Rule for RankedPairDiscount {
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
        let mut ranked: Vec<usize> = view.visible_tagged(&self.tag).map(|(i, _)| i).collect();
        view.sort_by_net_price_desc(&mut ranked);

        complete_groups(&ranked, 2)
            .map(|pair| {
                let off = view.net_total_of(pair).percent_of(self.rate);
                self.meta.record(view.matched_proportional(pair, off))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::money::Money;
    use crate::types::Item;

    #[test]
    fn test_priciest_items_paired_first() {
        let cart = Cart::new(vec![
            Item::new(1, "A", "A", Money::from_units(30), ["hot"]),
            Item::new(2, "B", "B", Money::from_units(70), ["hot"]),
            Item::new(3, "C", "C", Money::from_units(50), ["hot"]),
        ]);
        let rule = RankedPairDiscount::new(RuleId(6), "hot", DiscountRate::from_percent(12));
        let records = rule.process(&CartView::new(&cart));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item_ids(), vec![2, 3]);
        // 12% of 120
        assert_eq!(records[0].amount, Money::from_cents(1440));
    }

    #[test]
    fn test_equal_prices_keep_cart_order() {
        let cart = Cart::new(vec![
            Item::new(1, "A", "A", Money::from_units(40), ["hot"]),
            Item::new(2, "B", "B", Money::from_units(40), ["hot"]),
            Item::new(3, "C", "C", Money::from_units(40), ["hot"]),
            Item::new(4, "D", "D", Money::from_units(40), ["hot"]),
        ]);
        let rule = RankedPairDiscount::new(RuleId(6), "hot", DiscountRate::from_percent(10));
        let pairs: Vec<Vec<u32>> = rule
            .process(&CartView::new(&cart))
            .iter()
            .map(|r| r.item_ids())
            .collect();
        assert_eq!(pairs, vec![vec![1, 2], vec![3, 4]]);
    }
}
