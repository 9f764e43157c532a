//! Sequential composition of two rules over overlapping items.

use tracing::trace;

use crate::rules::{CartView, Rule, RuleMeta};
use crate::types::{DiscountRecord, RuleId};

/// Runs `first`, then gives `second` a fair pass over the same items.
///
/// Items `first` matched are normally hidden from `second` when `first`
/// is exclusive. The exception is an item that also carries `second`'s
/// target tag: it stays visible to `second` (at its reduced net price), so
/// both discounts can stack on it. Example: "add 10 for one more" plus
/// "any two hot drinks 12% off" on drinks tagged with both.
///
/// Records keep the identity of the sub-rule that produced them.
#[derive(Debug)]
pub struct CompoundRule {
    meta: RuleMeta,
    first: Box<dyn Rule>,
    second: Box<dyn Rule>,
}

impl CompoundRule {
    pub fn new(id: RuleId, first: Box<dyn Rule>, second: Box<dyn Rule>) -> Self {
        let name = format!("{} + {}", first.meta().info.name, second.meta().info.name);
        let note = [first.meta().info.note.as_str(), second.meta().info.note.as_str()]
            .iter()
            .filter(|n| !n.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(";");
        CompoundRule {
            meta: RuleMeta::new(id, name).with_note(note),
            first,
            second,
        }
    }

    pub fn parts(&self) -> (&dyn Rule, &dyn Rule) {
        (self.first.as_ref(), self.second.as_ref())
    }
}

impl Rule for CompoundRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn process(&self, view: &CartView<'_>) -> Vec<DiscountRecord> {
        let mut records = self.first.process(view);

        let first_exclusive = self.first.exclusive_tag().is_some();
        let second_tag = self.second.target_tag();
        let next = view.after(&records, |item| {
            first_exclusive && !second_tag.is_some_and(|tag| item.has_tag(tag))
        });

        let first_count = records.len();
        records.extend(self.second.process(&next));
        trace!(
            rule = %self.meta.info.id,
            first = first_count,
            second = records.len() - first_count,
            "Compound parts processed"
        );
        records
    }
}
