//! Same-SKU buy-more discount ("加購"): add a second unit of the same
//! product for a fixed special price.

use crate::money::Money;
use crate::rules::{complete_groups, CartView, Rule, RuleMeta};
use crate::types::{DiscountRecord, RuleId};

/// Groups visible tagged items by SKU (groups in order of first
/// appearance, items in cart order inside a group) and pairs them up
/// within each group. The second unit of a pair is brought down to
/// `special_price`: amount = net price of that unit − special price.
///
/// A special price above the unit price yields a negative proposal; the
/// engine's record validation clamps it to zero and reports it.
#[derive(Debug, Clone)]
pub struct SameSkuDiscount {
    meta: RuleMeta,
    tag: String,
    special_price: Money,
}

impl SameSkuDiscount {
    pub fn new(id: RuleId, tag: impl Into<String>, special_price: Money) -> Self {
        SameSkuDiscount {
            meta: RuleMeta::new(id, "Same item add-on")
                .with_note(format!("add {special_price} for one more")),
            tag: tag.into(),
            special_price,
        }
    }

    pub fn special_price(&self) -> Money {
        self.special_price
    }
}

impl Rule for SameSkuDiscount {
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
        // Vec of groups rather than a map: group order must follow the cart
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        for (index, item) in view.visible_tagged(&self.tag) {
            match groups.iter_mut().find(|(sku, _)| *sku == item.sku) {
                Some((_, members)) => members.push(index),
                None => groups.push((item.sku.as_str(), vec![index])),
            }
        }

        groups
            .iter()
            .flat_map(|(_, members)| complete_groups(members, 2))
            .map(|pair| {
                let off = view.net_price(pair[1]) - self.special_price;
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

    fn item(id: u32, sku: &str, price: i64) -> Item {
        Item::new(id, sku, sku, Money::from_units(price), ["addon"])
    }

    #[test]
    fn test_pair_brought_to_special_price() {
        let cart = Cart::new(vec![item(1, "A", 50), item(2, "A", 50)]);
        let rule = SameSkuDiscount::new(RuleId(1), "addon", Money::from_units(10));
        let records = rule.process(&CartView::new(&cart));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, Money::from_units(40));
        assert_eq!(records[0].items[1].allocated, Money::from_units(40));
    }

    #[test]
    fn test_groups_follow_first_appearance() {
        let cart = Cart::new(vec![
            item(1, "B", 30),
            item(2, "A", 50),
            item(3, "B", 30),
            item(4, "A", 50),
            item(5, "A", 50),
        ]);
        let rule = SameSkuDiscount::new(RuleId(1), "addon", Money::from_units(10));
        let records = rule.process(&CartView::new(&cart));

        let pairs: Vec<Vec<u32>> = records.iter().map(|r| r.item_ids()).collect();
        assert_eq!(pairs, vec![vec![1, 3], vec![2, 4]]);
        assert_eq!(records[0].amount, Money::from_units(20));
    }

    #[test]
    fn test_special_price_above_unit_price_is_negative_proposal() {
        let cart = Cart::new(vec![item(1, "A", 5), item(2, "A", 5)]);
        let rule = SameSkuDiscount::new(RuleId(1), "addon", Money::from_units(10));
        let records = rule.process(&CartView::new(&cart));
        assert_eq!(records[0].amount, Money::from_units(-5));
    }
}
