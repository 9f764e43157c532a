//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  Fatal (abort checkout before any mutation)                             │
//! │  ├── CoreError        - malformed cart, duplicate ids, total drift      │
//! │  └── ValidationError  - field-level input failures                      │
//! │                                                                         │
//! │  Recoverable (record clamped, run continues, reported)                  │
//! │  └── DiscountViolation - negative / oversized / empty discount records  │
//! │                                                                         │
//! │  CLI errors (separate crate)                                            │
//! │  └── CliError         - io, parse and config failures                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → stderr                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rule whose tag, SKU or priority matches nothing is NOT an error: it
//! simply emits no records.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;
use crate::types::RuleId;

// =============================================================================
// Core Error
// =============================================================================

/// Errors that abort a checkout run.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A product record could not be turned into a cart item.
    ///
    /// ## When This Occurs
    /// - Loader supplied a product without a price or without a tag set
    /// - Price or carried-in discount is out of range
    ///
    /// The whole cart is rejected; nothing is partially built.
    #[error("Malformed item at position {position} ({sku}): {source}")]
    MalformedItem {
        position: usize,
        sku: String,
        #[source]
        source: ValidationError,
    },

    /// Two items in one cart share an id.
    #[error("Duplicate item id {0} in cart")]
    DuplicateItemId(u32),

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// After a run the two total formulas disagree.
    ///
    /// Σ(unit − discount) must equal Σ unit − Σ record amounts. A mismatch
    /// means an applied record did not debit its items; it is a bug, never
    /// a data problem.
    #[error("Total mismatch: per-item total {per_item}, per-discount total {per_discount}")]
    TotalMismatch { per_item: Money, per_discount: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Discount Violation
// =============================================================================

/// A data-integrity problem found in a rule's output.
///
/// ## Handling
/// ```text
/// Rule::process ──► DiscountRecord { amount: -30 }
///                          │
///                          ▼
///            validate_record() ← clamps allocation to 0
///                          │
///                          ├──► warn!(...)              (log)
///                          └──► CheckoutReport.violations (caller)
/// ```
/// The run keeps going; the clamped record is still applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountViolation {
    /// A rule tried to give a negative discount (i.e. raise the price).
    #[error("Rule {rule_id} proposed negative discount {proposed} on item {item_id}; clamped to 0")]
    NegativeAmount {
        rule_id: RuleId,
        item_id: u32,
        proposed: Money,
    },

    /// A rule tried to discount more than what is left of an item's price.
    #[error("Rule {rule_id} proposed {proposed} on item {item_id} but only {net_price} remains; clamped")]
    ExceedsNetPrice {
        rule_id: RuleId,
        item_id: u32,
        proposed: Money,
        net_price: Money,
    },

    /// A rule emitted a record without matched items.
    #[error("Rule {rule_id} emitted a discount record with no matched items; dropped")]
    EmptyMatch { rule_id: RuleId },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::MalformedItem {
            position: 3,
            sku: "COKE-330".to_string(),
            source: ValidationError::Required {
                field: "price".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Malformed item at position 3 (COKE-330): price is required"
        );

        let err = CoreError::DuplicateItemId(7);
        assert_eq!(err.to_string(), "Duplicate item id 7 in cart");
    }

    #[test]
    fn test_violation_messages() {
        let v = DiscountViolation::NegativeAmount {
            rule_id: RuleId(2),
            item_id: 5,
            proposed: Money::from_cents(-1000),
        };
        assert_eq!(
            v.to_string(),
            "Rule #2 proposed negative discount -$10.00 on item 5; clamped to 0"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_violation_serializes_with_kind_tag() {
        let v = DiscountViolation::EmptyMatch { rule_id: RuleId(1) };
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"kind":"empty_match","rule_id":1}"#);
    }
}
