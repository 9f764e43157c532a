//! # Checkout Report
//!
//! Plain-text rendering of a priced cart.
//!
//! ## Layout
//! ```text
//! Purchased items:
//! ---------------------------------------------------
//! - 01, [COKE]    $65.00, discount     $0.00, final    $65.00, Coke, Tags: #drink  add $10.00 for one more
//! - 02, [COKE]    $65.00, discount    $55.00, final    $10.00, Coke, Tags: #drink  add $10.00 for one more
//!
//! Discounts applied:
//! ---------------------------------------------------
//! - #1 Same item add-on (add $10.00 for one more), discount: $55.00
//!
//! ---------------------------------------------------
//! Subtotal:          $130.00
//! Discount:           $55.00
//! Checkout total:     $75.00
//! ```

use tally_core::{Cart, CheckoutReport, Item, Money};

const RULE: &str = "---------------------------------------------------";

/// Renders the report. With `sort_by_note` purchased items are grouped by
/// their discount notes (stable, undiscounted items first); otherwise they
/// keep cart order.
pub fn render_report(cart: &Cart, report: &CheckoutReport, sort_by_note: bool) -> String {
    let mut items: Vec<&Item> = cart.items().iter().collect();
    if sort_by_note {
        items.sort_by_key(|item| item.notes().join(";"));
    }

    let mut lines = vec!["Purchased items:".to_string(), RULE.to_string()];
    lines.extend(items.into_iter().map(item_line));

    lines.push(String::new());
    lines.push("Discounts applied:".to_string());
    lines.push(RULE.to_string());
    if report.discounts.is_empty() {
        lines.push("(none)".to_string());
    }
    for record in &report.discounts {
        let label = if record.rule.note.is_empty() {
            format!("{} {}", record.rule.id, record.rule.name)
        } else {
            format!("{} {} ({})", record.rule.id, record.rule.name, record.rule.note)
        };
        lines.push(format!("- {label}, discount: {}", record.amount));
    }

    if !report.violations.is_empty() {
        lines.push(String::new());
        lines.push("Violations:".to_string());
        lines.push(RULE.to_string());
        lines.extend(report.violations.iter().map(|v| format!("- {v}")));
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push(format!("Subtotal:        {}", amount(report.subtotal)));
    lines.push(format!("Discount:        {}", amount(report.discount_total)));
    lines.push(format!("Checkout total:  {}", amount(report.total)));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn item_line(item: &Item) -> String {
    let mut line = format!(
        "- {:02}, [{}] {}, discount {}, final {}, {}",
        item.id,
        item.sku,
        amount(item.unit_price),
        amount(item.discount()),
        amount(item.net_price()),
        item.name,
    );
    if !item.tags.is_empty() {
        let tags: Vec<String> = item.tags.iter().map(|t| format!("#{t}")).collect();
        line.push_str(", Tags: ");
        line.push_str(&tags.join(","));
    }
    if !item.notes().is_empty() {
        line.push_str("  ");
        line.push_str(&item.notes().join(";"));
    }
    line
}

fn amount(money: Money) -> String {
    format!("{:>9}", money.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::rules::{RuleBuilder, SameSkuDiscount};
    use tally_core::{CheckoutEngine, ProductRecord, RuleId};

    fn priced_cart() -> (Cart, CheckoutReport) {
        let mut cart = Cart::from_products(vec![
            ProductRecord::new("COKE", "Coke", 6500, ["drink"]),
            ProductRecord::new("CHIPS", "Chips", 3500, Vec::<String>::new()),
            ProductRecord::new("COKE", "Coke", 6500, ["drink"]),
        ])
        .unwrap();
        let engine = CheckoutEngine::new()
            .with_rule(SameSkuDiscount::new(RuleId(1), "drink", Money::from_units(10)).boxed());
        let report = engine.checkout(&mut cart).unwrap();
        (cart, report)
    }

    #[test]
    fn test_report_lists_items_discounts_and_total() {
        let (cart, report) = priced_cart();
        let text = render_report(&cart, &report, false);

        assert!(text.contains("- 01, [COKE]    $65.00, discount     $0.00, final    $65.00, Coke, Tags: #drink"));
        assert!(text.contains("- 02, [CHIPS]    $35.00, discount     $0.00, final    $35.00, Chips\n"));
        assert!(text.contains("add $10.00 for one more"));
        assert!(text.contains("- #1 Same item add-on (add $10.00 for one more), discount: $55.00"));
        assert!(text.contains("Checkout total:    $110.00"));
        assert!(!text.contains("Violations:"));
    }

    #[test]
    fn test_sort_by_note_moves_discounted_items_last() {
        let (cart, report) = priced_cart();
        let text = render_report(&cart, &report, true);

        let ids: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("- 0"))
            .map(|l| &l[2..4])
            .collect();
        assert_eq!(ids, vec!["02", "01", "03"]);

        let unsorted = render_report(&cart, &report, false);
        assert_eq!(unsorted.lines().count(), text.lines().count());
    }

    #[test]
    fn test_empty_discount_section_full_layout() {
        let mut cart = Cart::from_products(vec![ProductRecord::new("A", "A", 100, ["x"])]).unwrap();
        let report = CheckoutEngine::new().checkout(&mut cart).unwrap();
        let text = render_report(&cart, &report, false);

        let expected = [
            "Purchased items:",
            RULE,
            "- 01, [A]     $1.00, discount     $0.00, final     $1.00, A, Tags: #x",
            "",
            "Discounts applied:",
            RULE,
            "(none)",
            "",
            RULE,
            "Subtotal:            $1.00",
            "Discount:            $0.00",
            "Checkout total:      $1.00",
        ]
        .join("\n")
            + "\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_violations_are_listed() {
        let mut cart = Cart::from_products(vec![
            ProductRecord::new("A", "A", 500, ["addon"]),
            ProductRecord::new("A", "A", 500, ["addon"]),
        ])
        .unwrap();
        let engine = CheckoutEngine::new()
            .with_rule(SameSkuDiscount::new(RuleId(1), "addon", Money::from_units(10)).boxed());
        let report = engine.checkout(&mut cart).unwrap();
        let text = render_report(&cart, &report, false);

        assert!(text.contains("\nViolations:\n"));
        assert!(text.contains("- Rule #1 proposed negative discount -$5.00 on item 2; clamped to 0\n"));
        assert!(text.ends_with("Checkout total:     $10.00\n"));
    }
}
