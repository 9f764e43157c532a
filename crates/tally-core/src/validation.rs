//! # Validation Module
//!
//! Input and output validation for the discount engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Product records (fail fast)                                  │
//! │  ├── validate_product()  - sku, name, price, tags, carried discount    │
//! │  └── Any failure rejects the whole cart before it is built             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart (fail fast, before the run mutates anything)            │
//! │  └── validate_cart()     - prices, unique ids, size                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Discount records (recoverable)                               │
//! │  └── validate_record()   - clamp each allocation into [0, net price]   │
//! │                             and report a DiscountViolation             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_price_cents, validate_sku};
//!
//! assert!(validate_sku("COKE-330").is_ok());
//! assert!(validate_price_cents(-1).is_err());
//! ```

use std::collections::BTreeSet;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, DiscountViolation, ValidationError};
use crate::money::{DiscountRate, Money};
use crate::types::{DiscountRecord, ProductRecord};
use crate::{MAX_CART_ITEMS, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
///
/// Unlike a catalogue SKU the cart accepts any printable text, since the
/// loader may hand over SKUs in any script.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a product name (required, at most 200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents. Zero is allowed (free items); anything
/// above [`MAX_PRICE_CENTS`] is rejected.
///
/// ```rust
/// use tally_core::validation::validate_price_cents;
/// use tally_core::MAX_PRICE_CENTS;
///
/// assert!(validate_price_cents(6500).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a discount rate (0% to 100%).
pub fn validate_rate(rate: DiscountRate) -> ValidationResult<()> {
    if rate.bps() > DiscountRate::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "percent_off".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a group size for bundle/pair rules.
pub fn validate_group_size(size: usize) -> ValidationResult<()> {
    if size == 0 {
        return Err(ValidationError::MustBePositive {
            field: "count".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Product / Cart Validators
// =============================================================================

/// Validates one loader record.
///
/// ## Rules
/// - sku and name as above
/// - price present and non-negative
/// - tag set present (may be empty)
/// - carried-in discount within `[0, price]`
pub fn validate_product(record: &ProductRecord) -> ValidationResult<()> {
    validate_sku(&record.sku)?;
    validate_product_name(&record.name)?;

    let price = record.price_cents.ok_or_else(|| ValidationError::Required {
        field: "price".to_string(),
    })?;
    validate_price_cents(price)?;

    if record.tags.is_none() {
        return Err(ValidationError::Required {
            field: "tags".to_string(),
        });
    }

    if record.discount_cents < 0 || record.discount_cents > price {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: price,
        });
    }

    Ok(())
}

/// Validates a whole cart before a checkout run.
///
/// Items can be constructed directly with public fields, so this repeats
/// the price check even for carts built through `Cart::from_products`.
pub fn validate_cart(cart: &Cart) -> CoreResult<()> {
    if cart.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    let mut seen = BTreeSet::new();
    for (position, item) in cart.items().iter().enumerate() {
        if !seen.insert(item.id) {
            return Err(CoreError::DuplicateItemId(item.id));
        }
        validate_price_cents(item.unit_price.cents()).map_err(|source| {
            CoreError::MalformedItem {
                position,
                sku: item.sku.clone(),
                source,
            }
        })?;
    }

    Ok(())
}

// =============================================================================
// Discount Record Validator
// =============================================================================

/// Clamps a record's allocations against the cart's current net prices.
///
/// ## Rules
/// - An allocation below zero becomes zero (`NegativeAmount`)
/// - An allocation above the item's net price becomes the net price
///   (`ExceedsNetPrice`)
/// - `amount` is recomputed from the clamped allocations, so it is always
///   within `[0, Σ net prices of matched items]`
///
/// Returns the violations found; an empty vector means the record was
/// already sound.
pub fn validate_record(record: &mut DiscountRecord, cart: &Cart) -> Vec<DiscountViolation> {
    let mut violations = Vec::new();
    let rule_id = record.rule.id;

    if record.items.is_empty() {
        violations.push(DiscountViolation::EmptyMatch { rule_id });
        record.amount = Money::zero();
        return violations;
    }

    for matched in &mut record.items {
        let net_price = cart
            .items()
            .get(matched.index)
            .map(|item| item.net_price())
            .unwrap_or_default();

        if matched.allocated.is_negative() {
            violations.push(DiscountViolation::NegativeAmount {
                rule_id,
                item_id: matched.item_id,
                proposed: matched.allocated,
            });
            matched.allocated = Money::zero();
        } else if matched.allocated > net_price {
            violations.push(DiscountViolation::ExceedsNetPrice {
                rule_id,
                item_id: matched.item_id,
                proposed: matched.allocated,
                net_price,
            });
            matched.allocated = net_price.max(Money::zero());
        }
    }

    record.recompute_amount();
    violations
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Item, MatchedItem, RuleId, RuleInfo};

    fn cart_of(prices: &[i64]) -> Cart {
        Cart::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, p)| Item::new(i as u32 + 1, "SKU", "Item", Money::from_units(*p), ["t"]))
                .collect(),
        )
    }

    fn record(allocs: &[i64]) -> DiscountRecord {
        DiscountRecord::new(
            RuleInfo::new(RuleId(9), "test"),
            None,
            allocs
                .iter()
                .enumerate()
                .map(|(i, a)| MatchedItem {
                    index: i,
                    item_id: i as u32 + 1,
                    allocated: Money::from_units(*a),
                })
                .collect(),
        )
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COKE-330").is_ok());
        assert!(validate_sku("可口可樂").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_product_requires_price_and_tags() {
        let ok = ProductRecord::new("A", "Apple", 100, ["fruit"]);
        assert!(validate_product(&ok).is_ok());

        let mut no_price = ok.clone();
        no_price.price_cents = None;
        assert_eq!(
            validate_product(&no_price),
            Err(ValidationError::Required { field: "price".to_string() })
        );

        let mut no_tags = ok.clone();
        no_tags.tags = None;
        assert_eq!(
            validate_product(&no_tags),
            Err(ValidationError::Required { field: "tags".to_string() })
        );

        let mut negative = ok.clone();
        negative.price_cents = Some(-1);
        assert!(validate_product(&negative).is_err());

        let mut over_discounted = ok;
        over_discounted.discount_cents = 101;
        assert!(validate_product(&over_discounted).is_err());
    }

    #[test]
    fn test_validate_product_accepts_empty_tag_set() {
        let record = ProductRecord::new("A", "Apple", 100, Vec::<String>::new());
        assert!(validate_product(&record).is_ok());
    }

    #[test]
    fn test_validate_cart_rejects_duplicate_ids() {
        let mut cart = cart_of(&[10, 20]);
        assert!(validate_cart(&cart).is_ok());

        cart.items_mut()[1].id = 1;
        assert!(matches!(validate_cart(&cart), Err(CoreError::DuplicateItemId(1))));
    }

    #[test]
    fn test_validate_cart_rejects_negative_price() {
        let mut cart = cart_of(&[10]);
        cart.items_mut()[0].unit_price = Money::from_cents(-5);
        assert!(matches!(
            validate_cart(&cart),
            Err(CoreError::MalformedItem { position: 0, .. })
        ));
    }

    #[test]
    fn test_validate_record_clamps_negative() {
        let cart = cart_of(&[50, 50]);
        let mut rec = record(&[0, -40]);
        let violations = validate_record(&mut rec, &cart);

        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], DiscountViolation::NegativeAmount { item_id: 2, .. }));
        assert_eq!(rec.amount, Money::zero());
    }

    #[test]
    fn test_validate_record_clamps_to_net_price() {
        let cart = cart_of(&[30, 50]);
        let mut rec = record(&[45, 10]);
        let violations = validate_record(&mut rec, &cart);

        assert_eq!(violations.len(), 1);
        assert_eq!(rec.items[0].allocated, Money::from_units(30));
        assert_eq!(rec.amount, Money::from_units(40));
    }

    #[test]
    fn test_validate_record_sound_record_untouched() {
        let cart = cart_of(&[30, 50]);
        let mut rec = record(&[10, 10]);
        assert!(validate_record(&mut rec, &cart).is_empty());
        assert_eq!(rec.amount, Money::from_units(20));
    }

    #[test]
    fn test_validate_record_drops_empty_match() {
        let cart = cart_of(&[30]);
        let mut rec = record(&[]);
        let violations = validate_record(&mut rec, &cart);
        assert_eq!(violations, vec![DiscountViolation::EmptyMatch { rule_id: RuleId(9) }]);
    }

    #[test]
    fn test_validate_price_upper_bound() {
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert_eq!(
            validate_price_cents(i64::MAX),
            Err(ValidationError::OutOfRange {
                field: "price".to_string(),
                min: 0,
                max: MAX_PRICE_CENTS,
            })
        );
    }

    #[test]
    fn test_validate_rate_and_group_size() {
        assert!(validate_rate(DiscountRate::from_percent(100)).is_ok());
        assert!(validate_rate(DiscountRate::from_percent(101)).is_err());
        assert!(validate_group_size(1).is_ok());
        assert!(validate_group_size(0).is_err());
    }
}
