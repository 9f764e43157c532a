//! # tally-core: Discount Rule Engine
//!
//! This crate prices a checkout cart: it runs an ordered set of discount
//! rules over the cart's items and keeps per-item and per-rule totals in
//! agreement. It is pure logic with no I/O; loading products and rule
//! tables is the caller's job.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    checkout-cli                                 │   │
//! │  │    products.json ──► Cart     rules.toml ──► Vec<Box<dyn Rule>> │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   rules   │  │ checkout  │  │   │
//! │  │   │   Item    │  │   Money   │  │ Rule trait│  │  Engine   │  │   │
//! │  │   │  Record   │  │   Rate    │  │ CartView  │  │  Report   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Items, loader records, discount records
//! - [`money`] - Money and discount rates with integer arithmetic
//! - [`cart`] - The cart a checkout run mutates
//! - [`rules`] - The `Rule` trait, `CartView` and the built-in rules
//! - [`checkout`] - The engine that runs rules in priority order
//! - [`error`] - Domain error types and discount violations
//! - [`validation`] - Input and record validation
//!
//! ## Design Principles
//!
//! 1. **Rules propose, the engine commits**: a rule only reads a
//!    [`rules::CartView`]; the engine alone writes to the cart.
//! 2. **Integer Money**: all amounts are cents (i64), rates are basis points.
//! 3. **Two totals, one answer**: Σ item net prices always equals
//!    subtotal − Σ discount records.
//! 4. **Re-runnable**: every checkout starts from a clean cart.
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::rules::{BundleDiscount, Reward, RuleBuilder};
//! use tally_core::{Cart, CheckoutEngine, DiscountRate, ProductRecord, RuleId};
//!
//! let mut cart = Cart::from_products(vec![
//!     ProductRecord::new("COKE", "Coke", 6500, ["drink"]),
//!     ProductRecord::new("TEA", "Tea", 3500, ["drink"]),
//! ])
//! .unwrap();
//!
//! let engine = CheckoutEngine::new().with_rule(
//!     BundleDiscount::new(RuleId(1), 2, Reward::Percent(DiscountRate::from_percent(12)))
//!         .tagged("drink")
//!         .boxed(),
//! );
//!
//! let report = engine.checkout(&mut cart).unwrap();
//! assert_eq!(report.discount_total.cents(), 1200);
//! assert_eq!(report.total.cents(), 8800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use checkout::{CheckoutEngine, CheckoutReport};
pub use error::{CoreError, CoreResult, DiscountViolation, ValidationError};
pub use money::{DiscountRate, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum items allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps pairing rules cheap.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum unit price in cents (10 billion currency units)
///
/// ## Business Reason
/// A full cart at this price still sums far inside `i64`, so totals and
/// allocations never overflow.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000_000;
