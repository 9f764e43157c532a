//! # Rule Set Configuration
//!
//! The active rules are described in a TOML file, one `[[rules]]` table per
//! rule, in execution-list order. `kind` picks the rule; the shared keys
//! `name`, `note`, `priority` and `exclusive` work on every kind.
//!
//! ## File Format
//! ```toml
//! [[rules]]
//! kind = "bundle"          # any 2 boxed drinks for 12% off
//! tag = "box"
//! count = 2
//! percent_off = 12
//! exclusive = "box"
//! priority = 10
//!
//! [[rules]]
//! kind = "compound"        # add-on price, then hot-drink pairs
//! [rules.first]
//! kind = "same_sku"
//! tag = "addon"
//! special_price_cents = 1000
//! exclusive = "addon"
//! [rules.second]
//! kind = "ranked_pair"
//! tag = "hot"
//! percent_off = 12
//!
//! [[rules]]
//! kind = "combo"
//! prefix = "combo"
//! tiers = [[39, 39, 39], [49, 59, 49]]   # [drink tier, food tier, price]
//! ```
//!
//! Amounts are in cents, except combo tiers which are whole units because
//! they also appear inside tags (`combo/39/drink`).
//!
//! Rule ids are assigned sequentially from 1 in file order; a compound
//! rule takes its id before its two parts.

use serde::{Deserialize, Serialize};
use tally_core::rules::{
    BundleDiscount, ComboDiscount, CompoundRule, RankedPairDiscount, Reward, Rule, RuleBuilder,
    SameSkuDiscount, SecondItemDiscount, ThresholdDiscount,
};
use tally_core::validation::{validate_group_size, validate_price_cents, validate_rate};
use tally_core::{DiscountRate, Money, RuleId, ValidationError, MAX_PRICE_CENTS};
use tracing::debug;

use crate::error::{CliError, CliResult};

// =============================================================================
// Schema
// =============================================================================

/// The whole rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// One `[[rules]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(flatten)]
    pub settings: RuleSettings,

    #[serde(flatten)]
    pub kind: RuleKind,
}

/// Keys shared by every rule kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSettings {
    /// Overrides the generated display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Note stamped on every discounted item.
    #[serde(default)]
    pub note: Option<String>,

    /// Lower runs first; unset runs after all prioritized rules.
    #[serde(default)]
    pub priority: Option<i32>,

    /// Exclusivity tag; items this rule touches are hidden from later rules.
    #[serde(default)]
    pub exclusive: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Every `count` visible items (optionally tagged) earn a reward.
    Bundle {
        count: usize,
        #[serde(default)]
        percent_off: Option<u32>,
        #[serde(default)]
        amount_off_cents: Option<i64>,
        #[serde(default)]
        tag: Option<String>,
        #[serde(default)]
        min_total_cents: Option<i64>,
    },

    /// Spend more than `min_total_cents`, get `amount_off_cents` off once.
    Threshold {
        min_total_cents: i64,
        amount_off_cents: i64,
        #[serde(default)]
        tag: Option<String>,
    },

    SecondItem {
        tag: String,
        percent_off: u32,
    },

    SameSku {
        tag: String,
        special_price_cents: i64,
    },

    RankedPair {
        tag: String,
        percent_off: u32,
    },

    Combo {
        #[serde(default = "default_combo_prefix")]
        prefix: String,
        #[serde(default = "default_drink_label")]
        drink_label: String,
        #[serde(default = "default_food_label")]
        food_label: String,
        tiers: Vec<[i64; 3]>,
    },

    Compound {
        first: Box<RuleConfig>,
        second: Box<RuleConfig>,
    },
}

fn default_combo_prefix() -> String {
    "combo".to_string()
}

fn default_drink_label() -> String {
    "drink".to_string()
}

fn default_food_label() -> String {
    "food".to_string()
}

impl RuleKind {
    /// The `kind` key as written in the file.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Bundle { .. } => "bundle",
            RuleKind::Threshold { .. } => "threshold",
            RuleKind::SecondItem { .. } => "second_item",
            RuleKind::SameSku { .. } => "same_sku",
            RuleKind::RankedPair { .. } => "ranked_pair",
            RuleKind::Combo { .. } => "combo",
            RuleKind::Compound { .. } => "compound",
        }
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Builds the rule list in file order, numbering rules from 1.
///
/// ```rust
/// use checkout_cli::rules::{build_rules, RuleSet};
///
/// let set: RuleSet = toml::from_str(r#"
///     [[rules]]
///     kind = "second_item"
///     tag = "tea"
///     percent_off = 50
/// "#).unwrap();
///
/// let rules = build_rules(&set).unwrap();
/// assert_eq!(rules[0].id().0, 1);
/// ```
pub fn build_rules(set: &RuleSet) -> CliResult<Vec<Box<dyn Rule>>> {
    let mut next_id = 0;
    set.rules
        .iter()
        .enumerate()
        .map(|(position, config)| config.build(position + 1, &mut next_id))
        .collect()
}

impl RuleConfig {
    /// Validates the parameters and builds the rule. `index` is the 1-based
    /// position in the file, used in error messages.
    pub fn build(&self, index: usize, next_id: &mut u32) -> CliResult<Box<dyn Rule>> {
        *next_id += 1;
        let id = RuleId(*next_id);
        let invalid = |reason: String| CliError::InvalidRule {
            index,
            kind: self.kind.name(),
            reason,
        };

        let rule = match &self.kind {
            RuleKind::Bundle {
                count,
                percent_off,
                amount_off_cents,
                tag,
                min_total_cents,
            } => {
                validate_group_size(*count).map_err(|e| invalid(e.to_string()))?;
                let reward = match (percent_off, amount_off_cents) {
                    (Some(percent), None) => Reward::Percent(rate(*percent).map_err(invalid)?),
                    (None, Some(cents)) => {
                        Reward::Amount(amount("amount_off_cents", *cents).map_err(invalid)?)
                    }
                    _ => {
                        return Err(invalid(
                            "exactly one of percent_off or amount_off_cents is required".into(),
                        ))
                    }
                };

                let mut rule = BundleDiscount::new(id, *count, reward);
                if let Some(tag) = tag {
                    rule = rule.tagged(required_tag(tag).map_err(invalid)?);
                }
                if let Some(cents) = min_total_cents {
                    rule = rule.with_min_total(amount("min_total_cents", *cents).map_err(invalid)?);
                }
                self.settings.apply(rule).boxed()
            }

            RuleKind::Threshold {
                min_total_cents,
                amount_off_cents,
                tag,
            } => {
                let min_total = amount("min_total_cents", *min_total_cents).map_err(invalid)?;
                let off = amount("amount_off_cents", *amount_off_cents).map_err(invalid)?;
                let mut rule = ThresholdDiscount::new(id, min_total, off);
                if let Some(tag) = tag {
                    rule = rule.tagged(required_tag(tag).map_err(invalid)?);
                }
                self.settings.apply(rule).boxed()
            }

            RuleKind::SecondItem { tag, percent_off } => {
                let tag = required_tag(tag).map_err(invalid)?;
                let rate = rate(*percent_off).map_err(invalid)?;
                self.settings
                    .apply(SecondItemDiscount::new(id, tag, rate))
                    .boxed()
            }

            RuleKind::SameSku {
                tag,
                special_price_cents,
            } => {
                let tag = required_tag(tag).map_err(invalid)?;
                let price = amount("special_price_cents", *special_price_cents).map_err(invalid)?;
                self.settings
                    .apply(SameSkuDiscount::new(id, tag, price))
                    .boxed()
            }

            RuleKind::RankedPair { tag, percent_off } => {
                let tag = required_tag(tag).map_err(invalid)?;
                let rate = rate(*percent_off).map_err(invalid)?;
                self.settings
                    .apply(RankedPairDiscount::new(id, tag, rate))
                    .boxed()
            }

            RuleKind::Combo {
                prefix,
                drink_label,
                food_label,
                tiers,
            } => {
                if tiers.is_empty() {
                    return Err(invalid("tiers must list at least one [drink, food, price]".into()));
                }
                let tuples: Vec<(i64, i64, i64)> = tiers
                    .iter()
                    .map(|[drink, food, price]| {
                        amount("tiers", *price)?;
                        if *drink < 0 || *food < 0 {
                            return Err(format!("tier [{drink}, {food}, {price}] has a negative tier"));
                        }
                        Ok((*drink, *food, *price))
                    })
                    .collect::<Result<_, String>>()
                    .map_err(invalid)?;

                let rule = ComboDiscount::tiered(id, prefix, drink_label, food_label, &tuples);
                self.settings.apply(rule).boxed()
            }

            RuleKind::Compound { first, second } => {
                let first = first.build(index, next_id)?;
                let second = second.build(index, next_id)?;
                self.settings
                    .apply(CompoundRule::new(id, first, second))
                    .boxed()
            }
        };

        debug!(
            rule = %rule.id(),
            kind = self.kind.name(),
            name = %rule.meta().info.name,
            priority = ?rule.priority(),
            exclusive = ?rule.exclusive_tag(),
            "Rule configured"
        );
        Ok(rule)
    }
}

impl RuleSettings {
    /// Applies the shared keys on top of a freshly built rule.
    fn apply<R: RuleBuilder>(&self, mut rule: R) -> R {
        if let Some(name) = &self.name {
            rule = rule.named(name.clone());
        }
        if let Some(note) = &self.note {
            rule = rule.with_note(note.clone());
        }
        if let Some(priority) = self.priority {
            rule = rule.with_priority(priority);
        }
        if let Some(tag) = &self.exclusive {
            rule = rule.exclusive(tag.clone());
        }
        rule
    }
}

// =============================================================================
// Parameter Checks
// =============================================================================

fn rate(percent: u32) -> Result<DiscountRate, String> {
    let rate = DiscountRate::from_bps(percent.saturating_mul(100));
    validate_rate(rate).map_err(|e| e.to_string())?;
    Ok(rate)
}

fn amount(field: &str, cents: i64) -> Result<Money, String> {
    validate_price_cents(cents).map_err(|_| {
        format!("{field} must be between 0 and {MAX_PRICE_CENTS}, got {cents}")
    })?;
    Ok(Money::from_cents(cents))
}

fn required_tag(tag: &str) -> Result<String, String> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(ValidationError::Required {
            field: "tag".to_string(),
        }
        .to_string());
    }
    Ok(tag.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> RuleSet {
        toml::from_str(source).unwrap()
    }

    #[test]
    fn test_every_kind_parses_and_builds() {
        let set = parse(
            r#"
            [[rules]]
            kind = "bundle"
            count = 2
            percent_off = 12
            tag = "box"

            [[rules]]
            kind = "threshold"
            min_total_cents = 100000
            amount_off_cents = 10000

            [[rules]]
            kind = "second_item"
            tag = "tea"
            percent_off = 50

            [[rules]]
            kind = "same_sku"
            tag = "addon"
            special_price_cents = 1000

            [[rules]]
            kind = "ranked_pair"
            tag = "hot"
            percent_off = 12

            [[rules]]
            kind = "combo"
            tiers = [[39, 39, 39], [49, 59, 49]]
            "#,
        );

        let kinds: Vec<&str> = set.rules.iter().map(|r| r.kind.name()).collect();
        assert_eq!(
            kinds,
            vec!["bundle", "threshold", "second_item", "same_sku", "ranked_pair", "combo"]
        );

        let rules = build_rules(&set).unwrap();
        let ids: Vec<u32> = rules.iter().map(|r| r.id().0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_shared_settings_apply() {
        let set = parse(
            r#"
            [[rules]]
            kind = "second_item"
            tag = "tea"
            percent_off = 50
            name = "Tea pair"
            note = "second tea half price"
            priority = 3
            exclusive = "tea-pair"
            "#,
        );
        let rules = build_rules(&set).unwrap();
        let meta = rules[0].meta();

        assert_eq!(meta.info.name, "Tea pair");
        assert_eq!(meta.info.note, "second tea half price");
        assert_eq!(meta.priority, Some(3));
        assert_eq!(meta.exclusive_tag.as_deref(), Some("tea-pair"));
    }

    #[test]
    fn test_compound_ids_and_parts() {
        let set = parse(
            r#"
            [[rules]]
            kind = "threshold"
            min_total_cents = 0
            amount_off_cents = 100

            [[rules]]
            kind = "compound"
            [rules.first]
            kind = "same_sku"
            tag = "addon"
            special_price_cents = 1000
            exclusive = "addon"
            [rules.second]
            kind = "ranked_pair"
            tag = "hot"
            percent_off = 12
            "#,
        );
        let rules = build_rules(&set).unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].id(), RuleId(2));
        assert!(rules[1].meta().info.name.contains(" + "));
        assert_eq!(rules[1].meta().info.note, "add $10.00 for one more");
    }

    #[test]
    fn test_unknown_kind_is_toml_error() {
        let result: Result<RuleSet, _> = toml::from_str(
            r#"
            [[rules]]
            kind = "buy_one_get_ten"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_parameters_name_the_rule() {
        let set = parse(
            r#"
            [[rules]]
            kind = "ranked_pair"
            tag = "hot"
            percent_off = 12

            [[rules]]
            kind = "bundle"
            count = 0
            percent_off = 10
            "#,
        );
        match build_rules(&set) {
            Err(CliError::InvalidRule { index, kind, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(kind, "bundle");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_bundle_needs_exactly_one_reward() {
        let both = parse(
            r#"
            [[rules]]
            kind = "bundle"
            count = 2
            percent_off = 10
            amount_off_cents = 100
            "#,
        );
        assert!(build_rules(&both).is_err());

        let neither = parse(
            r#"
            [[rules]]
            kind = "bundle"
            count = 2
            "#,
        );
        assert!(build_rules(&neither).is_err());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for source in [
            "[[rules]]\nkind = \"second_item\"\ntag = \"tea\"\npercent_off = 150",
            "[[rules]]\nkind = \"same_sku\"\ntag = \"addon\"\nspecial_price_cents = -1",
            "[[rules]]\nkind = \"ranked_pair\"\ntag = \"  \"\npercent_off = 10",
            "[[rules]]\nkind = \"combo\"\ntiers = []",
        ] {
            assert!(build_rules(&parse(source)).is_err(), "accepted: {source}");
        }
    }
}
