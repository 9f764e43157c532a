//! Read-only window over a cart, handed to rules.
//!
//! A rule never sees `&mut Cart`. It sees a `CartView`, which answers
//! "which items may I match, and what are they worth right now?". The
//! engine builds a fresh view for every rule, so a rule observes exactly
//! the effects of the rules that ran before it.
//!
//! Composite rules derive a second view with [`CartView::after`] to let a
//! follow-up sub-rule see the first sub-rule's (not yet applied) results.

use std::collections::{BTreeMap, BTreeSet};

use crate::cart::Cart;
use crate::money::Money;
use crate::types::{DiscountRecord, Item, MatchedItem};

#[derive(Debug, Clone)]
pub struct CartView<'a> {
    cart: &'a Cart,
    hidden: BTreeSet<usize>,
    pending: BTreeMap<usize, Money>,
}

impl<'a> CartView<'a> {
    pub fn new(cart: &'a Cart) -> Self {
        CartView {
            cart,
            hidden: BTreeSet::new(),
            pending: BTreeMap::new(),
        }
    }

    pub fn cart(&self) -> &'a Cart {
        self.cart
    }

    pub fn item(&self, index: usize) -> Option<&'a Item> {
        self.cart.items().get(index)
    }

    /// Eligible in the cart and not hidden by this view.
    pub fn is_visible(&self, index: usize) -> bool {
        self.item(index)
            .map(|item| item.is_eligible() && !self.hidden.contains(&index))
            .unwrap_or(false)
    }

    /// Net price including discounts still pending in this view.
    pub fn net_price(&self, index: usize) -> Money {
        let pending = self.pending.get(&index).copied().unwrap_or_default();
        self.item(index)
            .map(|item| item.net_price() - pending)
            .unwrap_or_default()
    }

    /// Visible items in stable cart order.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &'a Item)> + '_ {
        self.cart
            .items()
            .iter()
            .enumerate()
            .filter(move |(index, _)| self.is_visible(*index))
    }

    /// Visible items carrying `tag`, in stable cart order.
    pub fn visible_tagged<'s>(
        &'s self,
        tag: &'s str,
    ) -> impl Iterator<Item = (usize, &'a Item)> + 's {
        self.visible().filter(move |(_, item)| item.has_tag(tag))
    }

    /// Visible items, optionally narrowed to a tag.
    pub fn visible_matching<'s>(
        &'s self,
        tag: Option<&'s str>,
    ) -> impl Iterator<Item = (usize, &'a Item)> + 's {
        self.visible()
            .filter(move |(_, item)| tag.map_or(true, |t| item.has_tag(t)))
    }

    /// Σ net prices of visible items.
    pub fn visible_net_total(&self) -> Money {
        self.visible().map(|(index, _)| self.net_price(index)).sum()
    }

    /// Σ net prices of the given items.
    pub fn net_total_of(&self, indices: &[usize]) -> Money {
        indices.iter().map(|&i| self.net_price(i)).sum()
    }

    /// Orders item indices by descending net price. The sort is stable, so
    /// equal prices keep cart order.
    pub fn sort_by_net_price_desc(&self, indices: &mut [usize]) {
        indices.sort_by(|a, b| self.net_price(*b).cmp(&self.net_price(*a)));
    }

    /// Builds matched-item entries for `indices` with the given allocations.
    pub fn matched(&self, indices: &[usize], allocations: &[Money]) -> Vec<MatchedItem> {
        indices
            .iter()
            .zip(allocations)
            .map(|(&index, &allocated)| MatchedItem {
                index,
                item_id: self.item(index).map(|item| item.id).unwrap_or_default(),
                allocated,
            })
            .collect()
    }

    /// Matched entries that spread `amount` over `indices` by net price.
    pub fn matched_proportional(&self, indices: &[usize], amount: Money) -> Vec<MatchedItem> {
        let weights: Vec<Money> = indices.iter().map(|&i| self.net_price(i)).collect();
        self.matched(indices, &amount.allocate(&weights))
    }

    /// A derived view where `records` are treated as already applied.
    ///
    /// Their allocations count as pending discounts (clamped to what the
    /// item is worth), and every touched item for which `hide` returns
    /// true disappears from the derived view.
    pub fn after<F>(&self, records: &[DiscountRecord], hide: F) -> CartView<'a>
    where
        F: Fn(&Item) -> bool,
    {
        let mut next = self.clone();
        for record in records {
            for matched in &record.items {
                let net = next.net_price(matched.index);
                let debit = matched.allocated.clamp_to(Money::zero(), net.max(Money::zero()));
                *next.pending.entry(matched.index).or_default() += debit;

                if self.item(matched.index).map_or(false, &hide) {
                    next.hidden.insert(matched.index);
                }
            }
        }
        next
    }
}
