use crate::store::{format_amount, Product, Sale, SalesSummary};

/// Wrap recognized text in a system-context block
///
/// The block lists today's sales and the shelf location of every product so the
/// assistant can answer "where is" and "how much did I sell" questions.
pub fn build_context_message(
    text: &str,
    inventory: &[Product],
    sales: &[Sale],
    currency: &str,
) -> String {
    let summary = SalesSummary::today(sales);
    format_context(text, inventory, &summary, currency)
}

fn format_context(text: &str, inventory: &[Product], summary: &SalesSummary, currency: &str) -> String {
    let sales_lines = if summary.sales.is_empty() {
        "None".to_string()
    } else {
        summary
            .sales
            .iter()
            .map(|s| {
                format!(
                    "- {}x {} ({}{})",
                    s.quantity,
                    s.product_name,
                    currency,
                    format_amount(s.total_amount)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let locations = inventory
        .iter()
        .map(|p| {
            format!(
                "{}: {}",
                p.name.primary(),
                p.shelf_position.as_deref().unwrap_or("?")
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    format!(
        "[SYSTEM CONTEXT]\nSales Today: Total {}{}\nList:\n{}\n\nLocations: {}\n[/SYSTEM CONTEXT]\n\nUser Spoke: {}",
        currency,
        format_amount(summary.total),
        sales_lines,
        locations,
        text
    )
}
