//! # Tally Checkout Runner
//!
//! Thin I/O layer around `tally-core`: loads a cart and a rule set from
//! disk, runs one checkout and renders the result.
//!
//! ## Module Organization
//! ```text
//! checkout_cli/
//! ├── lib.rs          ◄─── You are here (logging setup & run)
//! ├── config.rs       ◄─── AppConfig, flags, env overrides
//! ├── loader.rs       ◄─── products.json / rules.toml
//! ├── rules.rs        ◄─── RuleConfig → Box<dyn Rule>
//! ├── report.rs       ◄─── Plain-text report
//! └── error.rs        ◄─── CliError
//! ```
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()          RUST_LOG or "info,tally=debug", to stderr  │
//! │  2. AppConfig::load()       defaults → tally.toml → TALLY_* → flags    │
//! │  3. load_products()         JSON → ProductRecord → Cart                │
//! │  4. load_rules()            TOML → RuleConfig → Box<dyn Rule>          │
//! │  5. CheckoutEngine::checkout(&mut cart)                                │
//! │  6. render_report()         string for stdout                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod report;
pub mod rules;

use tally_core::CheckoutEngine;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use error::CliResult;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tally=debug";

/// Installs the global tracing subscriber.
///
/// Logs go to stderr so the report on stdout can be piped cleanly.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads everything `config` points at, runs one checkout and returns the
/// rendered report.
pub fn run(config: &AppConfig) -> CliResult<String> {
    let mut cart = loader::load_products(&config.products)?;
    let engine = CheckoutEngine::new().with_rules(loader::load_rules(&config.rules)?);

    let report = engine.checkout(&mut cart)?;
    info!(
        total = %report.total,
        violations = report.violations.len(),
        "Checkout finished"
    );

    Ok(report::render_report(&cart, &report, config.sort_by_note))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tally_core::Money;

    fn demo(file: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../demo")
            .join(file)
    }

    fn demo_config() -> AppConfig {
        AppConfig {
            products: demo("products.json"),
            rules: demo("rules.toml"),
            sort_by_note: false,
        }
    }

    #[test]
    fn test_demo_checkout() {
        let config = demo_config();
        let mut cart = loader::load_products(&config.products).unwrap();
        let engine = CheckoutEngine::new().with_rules(loader::load_rules(&config.rules).unwrap());
        let report = engine.checkout(&mut cart).unwrap();

        let amounts: Vec<i64> = report.discounts.iter().map(|d| d.amount.cents()).collect();
        // boxes, add-on latte, two hot pairs, two combos, snacks
        assert_eq!(amounts, vec![10800, 5500, 1620, 780, 3900, 5900, 500]);
        assert_eq!(report.subtotal, Money::from_cents(137_600));
        assert_eq!(report.total, Money::from_cents(108_600));
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_run_renders_report() {
        let text = run(&demo_config()).unwrap();
        assert!(text.contains("Checkout total:   $1086.00"));
        assert!(text.contains("Meal deal (drink + food combo)"));
    }

    #[test]
    fn test_run_reports_missing_rules_file() {
        let mut config = demo_config();
        config.rules = demo("missing.toml");
        assert!(matches!(run(&config), Err(error::CliError::Io { .. })));
    }
}
