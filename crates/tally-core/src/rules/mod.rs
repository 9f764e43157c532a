//! # Discount Rules
//!
//! A rule looks at the visible part of a cart and proposes discount
//! records. It never touches the cart itself.
//!
//! ## Rule Catalogue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rule                  Groups by               Discount                 │
//! │  ────────────────────  ──────────────────────  ───────────────────────  │
//! │  BundleDiscount        every N visible items   N-bundle × % or fixed    │
//! │  ThresholdDiscount     whole visible cart      flat amount, once        │
//! │  SecondItemDiscount    pairs of a tag          % of the 2nd item        │
//! │  SameSkuDiscount       pairs of one SKU        2nd unit at fixed price  │
//! │  RankedPairDiscount    pairs, priciest first   % of the pair            │
//! │  ComboDiscount         drink × food tiers      pair at combo price      │
//! │  CompoundRule          two sub-rules           both, stacked            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//! - Scan only [`CartView::visible`] items, in cart order unless the rule
//!   explicitly sorts.
//! - Never emit a partial group.
//! - Return a fully materialized `Vec`; the engine folds it only after the
//!   rule has returned.
//! - Hold configuration only. `process` takes `&self`, so one rule set can
//!   serve many carts at once.

mod bundle;
mod combo;
mod compound;
mod ranked_pair;
mod same_sku;
mod second_item;
mod threshold;
mod view;

pub use bundle::{BundleDiscount, Reward};
pub use combo::{ComboDiscount, ComboEntry};
pub use compound::CompoundRule;
pub use ranked_pair::RankedPairDiscount;
pub use same_sku::SameSkuDiscount;
pub use second_item::SecondItemDiscount;
pub use threshold::ThresholdDiscount;
pub use view::CartView;

use std::fmt;

use crate::types::{DiscountRecord, MatchedItem, RuleId, RuleInfo};

// =============================================================================
// Rule Metadata
// =============================================================================

/// Identity and scheduling settings shared by every rule kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMeta {
    pub info: RuleInfo,
    /// Lower runs first. `None` runs after all prioritized rules.
    pub priority: Option<i32>,
    /// Tag added to every item this rule touches; such items become
    /// invisible to all later rules in the same run.
    pub exclusive_tag: Option<String>,
}

impl RuleMeta {
    pub fn new(id: RuleId, name: impl Into<String>) -> Self {
        RuleMeta {
            info: RuleInfo::new(id, name),
            priority: None,
            exclusive_tag: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.info.note = note.into();
        self
    }

    /// Wraps matched items into a record stamped with this rule.
    pub fn record(&self, items: Vec<MatchedItem>) -> DiscountRecord {
        DiscountRecord::new(self.info.clone(), self.exclusive_tag.as_deref(), items)
    }
}

// =============================================================================
// Rule Trait
// =============================================================================

/// A discount rule.
///
/// ## Implementing
/// ```rust
/// use tally_core::rules::{CartView, Rule, RuleMeta};
/// use tally_core::{DiscountRecord, Money, RuleId};
///
/// /// One unit off every visible item tagged "clearance".
/// #[derive(Debug)]
/// struct Clearance(RuleMeta);
///
/// impl Rule for Clearance {
///     fn meta(&self) -> &RuleMeta { &self.0 }
///     fn meta_mut(&mut self) -> &mut RuleMeta { &mut self.0 }
///
///     fn process(&self, view: &CartView<'_>) -> Vec<DiscountRecord> {
///         view.visible_tagged("clearance")
///             .map(|(i, _)| self.0.record(view.matched(&[i], &[Money::from_units(1)])))
///             .collect()
///     }
/// }
///
/// let rule = Clearance(RuleMeta::new(RuleId(1), "clearance"));
/// assert_eq!(rule.meta().info.name, "clearance");
/// ```
pub trait Rule: Send + Sync + fmt::Debug {
    fn meta(&self) -> &RuleMeta;

    fn meta_mut(&mut self) -> &mut RuleMeta;

    /// Tag the rule matches on, if it matches on a single tag.
    fn target_tag(&self) -> Option<&str> {
        None
    }

    /// Proposes discount records for the visible part of the cart.
    fn process(&self, view: &CartView<'_>) -> Vec<DiscountRecord>;

    fn id(&self) -> RuleId {
        self.meta().info.id
    }

    fn priority(&self) -> Option<i32> {
        self.meta().priority
    }

    fn exclusive_tag(&self) -> Option<&str> {
        self.meta().exclusive_tag.as_deref()
    }
}

/// Builder-style settings available on every concrete rule.
///
/// ```rust
/// use tally_core::rules::{RuleBuilder, SecondItemDiscount, Rule};
/// use tally_core::{DiscountRate, RuleId};
///
/// let rule = SecondItemDiscount::new(RuleId(3), "tea", DiscountRate::from_percent(50))
///     .with_priority(10)
///     .exclusive("second-item");
/// assert_eq!(rule.priority(), Some(10));
/// assert_eq!(rule.exclusive_tag(), Some("second-item"));
/// ```
pub trait RuleBuilder: Rule + Sized {
    fn with_priority(mut self, priority: i32) -> Self {
        self.meta_mut().priority = Some(priority);
        self
    }

    fn exclusive(mut self, tag: impl Into<String>) -> Self {
        self.meta_mut().exclusive_tag = Some(tag.into());
        self
    }

    fn named(mut self, name: impl Into<String>) -> Self {
        self.meta_mut().info.name = name.into();
        self
    }

    fn with_note(mut self, note: impl Into<String>) -> Self {
        self.meta_mut().info.note = note.into();
        self
    }

    fn boxed(self) -> Box<dyn Rule>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<T: Rule + Sized> RuleBuilder for T {}

/// Splits `indices` into consecutive complete groups of `size`; a trailing
/// partial group is dropped.
pub(crate) fn complete_groups(indices: &[usize], size: usize) -> impl Iterator<Item = &[usize]> {
    indices.chunks_exact(size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_groups_drops_partial() {
        let groups: Vec<&[usize]> = complete_groups(&[0, 1, 2, 3, 4], 2).collect();
        assert_eq!(groups, vec![&[0, 1][..], &[2, 3][..]]);
        assert_eq!(complete_groups(&[0, 1, 2], 6).count(), 0);
    }

    #[test]
    fn test_meta_record_stamps_rule() {
        let meta = RuleMeta::new(RuleId(4), "combo").with_note("餐餐超值配");
        let record = meta.record(Vec::new());
        assert_eq!(record.rule.id, RuleId(4));
        assert_eq!(record.rule.note, "餐餐超值配");
        assert_eq!(record.exclusive_tag, None);
    }
}
