//! File loading: products from JSON, rules from TOML.

use std::path::Path;

use tally_core::rules::Rule;
use tally_core::{Cart, ProductRecord};
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::rules::{build_rules, RuleSet};

fn read(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a JSON array of product records and builds the cart.
///
/// ```json
/// [
///   { "sku": "COKE", "name": "Coke", "price_cents": 6500, "tags": ["drink"] }
/// ]
/// ```
/// Items are numbered by position unless a record carries an `id`.
pub fn load_products(path: &Path) -> CliResult<Cart> {
    let records = parse_products(path, &read(path)?)?;
    let cart = Cart::from_products(records)?;
    info!(path = %path.display(), items = cart.len(), subtotal = %cart.subtotal(), "Products loaded");
    Ok(cart)
}

fn parse_products(path: &Path, contents: &str) -> CliResult<Vec<ProductRecord>> {
    serde_json::from_str(contents).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the TOML rule set and assembles it.
pub fn load_rules(path: &Path) -> CliResult<Vec<Box<dyn Rule>>> {
    let set = parse_rule_set(path, &read(path)?)?;
    let rules = build_rules(&set)?;
    info!(path = %path.display(), rules = rules.len(), "Rules loaded");
    Ok(rules)
}

fn parse_rule_set(path: &Path, contents: &str) -> CliResult<RuleSet> {
    toml::from_str(contents).map_err(|source| CliError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::CoreError;

    #[test]
    fn test_parse_products() {
        let json = r#"[
            {"sku": "COKE", "name": "Coke", "price_cents": 6500, "tags": ["drink", "hot"]},
            {"id": 7, "sku": "CHIPS", "name": "Chips", "price_cents": 3500, "tags": []}
        ]"#;
        let records = parse_products(Path::new("p.json"), json).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, Some(7));
        assert_eq!(records[0].tags.as_ref().map(|t| t.len()), Some(2));
    }

    #[test]
    fn test_product_without_price_fails_cart_build() {
        let json = r#"[{"sku": "COKE", "name": "Coke", "tags": ["drink"]}]"#;
        let records = parse_products(Path::new("p.json"), json).unwrap();
        assert!(matches!(
            Cart::from_products(records),
            Err(CoreError::MalformedItem { position: 0, .. })
        ));
    }

    #[test]
    fn test_not_an_array_is_json_error() {
        let err = parse_products(Path::new("p.json"), r#"{"sku": "A"}"#).unwrap_err();
        assert!(matches!(err, CliError::Json { .. }));
        assert!(err.to_string().contains("p.json"));
    }

    #[test]
    fn test_bad_rule_file_is_toml_error() {
        let err = parse_rule_set(Path::new("r.toml"), "[[rules]]\nkind = 5").unwrap_err();
        assert!(matches!(err, CliError::Toml { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_products(Path::new("does/not/exist.json")),
            Err(CliError::Io { .. })
        ));
    }
}
