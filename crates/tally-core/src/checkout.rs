//! # Checkout Engine
//!
//! Runs the active rules against a cart, in priority order, and folds
//! their records into the cart.
//!
//! ## One Run
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(&mut cart)                                                    │
//! │                                                                         │
//! │  1. validate_cart()            malformed? ──► Err, cart untouched       │
//! │  2. cart.reset()               clear records, discounts, exclusions     │
//! │  3. total = Σ unit prices                                               │
//! │  4. for rule in execution_order():                                      │
//! │       view    = CartView::new(&cart)     sees all earlier rules         │
//! │       records = rule.process(&view)      Vec, fully materialized        │
//! │       for record in records:                                            │
//! │         validate_record()  ──► clamp + DiscountViolation                │
//! │         cart.apply(record)     debit items, notes, exclusivity tag      │
//! │         total -= record.amount                                          │
//! │  5. check Σ(unit − discount) == total                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules within a run are strictly sequential: each rule's visibility
//! depends on everything the previous rules committed. Separate carts
//! share nothing, so one engine may serve many carts from many threads.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, DiscountViolation};
use crate::money::Money;
use crate::rules::{CartView, Rule};
use crate::types::DiscountRecord;
use crate::validation::{validate_cart, validate_record};

// =============================================================================
// Checkout Report
// =============================================================================

/// Outcome of one checkout run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutReport {
    /// Σ unit prices.
    pub subtotal: Money,
    /// Σ discount record amounts.
    pub discount_total: Money,
    /// subtotal − discount_total.
    pub total: Money,
    /// Records in application order.
    pub discounts: Vec<DiscountRecord>,
    /// Records that had to be clamped or dropped.
    pub violations: Vec<DiscountViolation>,
}

// =============================================================================
// Checkout Engine
// =============================================================================

/// The active rule set.
///
/// ## Example
/// ```rust
/// use tally_core::rules::{RuleBuilder, SameSkuDiscount};
/// use tally_core::{Cart, CheckoutEngine, Money, ProductRecord, RuleId};
///
/// let mut cart = Cart::from_products(vec![
///     ProductRecord::new("A", "Soap", 5000, ["addon"]),
///     ProductRecord::new("A", "Soap", 5000, ["addon"]),
/// ])
/// .unwrap();
///
/// let engine = CheckoutEngine::new()
///     .with_rule(SameSkuDiscount::new(RuleId(1), "addon", Money::from_units(10)).boxed());
///
/// let report = engine.checkout(&mut cart).unwrap();
/// assert_eq!(report.total, Money::from_units(60));
/// ```
#[derive(Debug, Default)]
pub struct CheckoutEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl CheckoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Rule>>,
    {
        self.rules.extend(rules);
        self
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Rules in insertion order.
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Rules in the order a run executes them.
    ///
    /// Stable ascending sort on priority: equal priorities keep insertion
    /// order, and rules without a priority run last, also in insertion
    /// order.
    pub fn execution_order(&self) -> Vec<&dyn Rule> {
        let mut ordered: Vec<&dyn Rule> = self.rules.iter().map(|r| r.as_ref()).collect();
        ordered.sort_by_key(|rule| match rule.priority() {
            Some(priority) => (0, priority),
            None => (1, 0),
        });
        ordered
    }

    /// Runs every rule against `cart` and returns the report.
    ///
    /// The previous run's state is discarded first, so calling this twice
    /// on the same cart yields identical records and totals.
    ///
    /// ## Errors
    /// - `MalformedItem` / `DuplicateItemId` / `CartTooLarge`: the cart is
    ///   invalid; nothing was mutated.
    /// - `TotalMismatch`: internal inconsistency, should never happen.
    pub fn checkout(&self, cart: &mut Cart) -> CoreResult<CheckoutReport> {
        validate_cart(cart)?;
        cart.reset();

        let subtotal = cart.subtotal();
        let mut total = subtotal;
        let mut violations = Vec::new();

        for rule in self.execution_order() {
            let records = {
                let view = CartView::new(cart);
                rule.process(&view)
            };

            let mut applied = Money::zero();
            let count = records.len();
            for mut record in records {
                let found = validate_record(&mut record, cart);
                for violation in &found {
                    warn!(rule = %rule.id(), %violation, "Discount record clamped");
                }
                let empty = record.items.is_empty();
                violations.extend(found);
                if empty {
                    continue;
                }

                if let Some(tag) = rule.exclusive_tag() {
                    cart.exclude(&record, tag);
                }
                total -= record.amount;
                applied += record.amount;
                cart.apply(record);
            }

            debug!(
                rule = %rule.id(),
                name = %rule.meta().info.name,
                records = count,
                amount = %applied,
                "Rule processed"
            );
        }

        cart.set_total(total);

        let per_item = cart.net_total();
        if per_item != total {
            return Err(CoreError::TotalMismatch {
                per_item,
                per_discount: total,
            });
        }

        let discount_total = cart.discount_total();
        info!(
            items = cart.len(),
            discounts = cart.discounts().len(),
            subtotal = %subtotal,
            discount = %discount_total,
            total = %total,
            "Checkout complete"
        );

        Ok(CheckoutReport {
            subtotal,
            discount_total,
            total,
            discounts: cart.discounts().to_vec(),
            violations,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
