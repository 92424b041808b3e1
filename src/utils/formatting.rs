use bigdecimal::BigDecimal;
use chrono::{DateTime, Local, Utc};
use console::style;
use tabled::{
    settings::{Alignment, Style},
    Table, Tabled,
};

use crate::{
    models::product::Product,
    view::cart_panel::{LineView, PanelFrame, PanelPhase},
};

#[derive(Tabled)]
struct CartTableRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Product")]
    name: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Subtotal")]
    subtotal: String,
}

#[derive(Tabled)]
struct CatalogTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Product")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Image")]
    image: String,
}

pub fn format_cart_table(lines: &[LineView]) -> String {
    if lines.is_empty() {
        return String::new();
    }

    let rows: Vec<CartTableRow> = lines
        .iter()
        .map(|line| CartTableRow {
            position: line.position,
            id: line.id.clone(),
            name: truncate(&line.name, 30),
            quantity: line.quantity,
            price: format_price(&line.price),
            subtotal: format_price(&line.line_total),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded()).with(Alignment::left());

    table.to_string()
}

pub fn format_catalog_table<'a>(products: impl IntoIterator<Item = &'a Product>) -> String {
    let rows: Vec<CatalogTableRow> = products
        .into_iter()
        .map(|product| CatalogTableRow {
            id: product.id.clone(),
            name: truncate(&product.name, 30),
            price: format_price(&product.price),
            image: product.image_src.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded()).with(Alignment::left());

    table.to_string()
}

/// Text rendering of the cart sidebar. Hidden panels render nothing.
pub fn format_panel(frame: &PanelFrame) -> String {
    if frame.phase == PanelPhase::Hidden {
        return String::new();
    }

    let mut output = String::new();

    let mut header = format!("🛒 {}", style("Carrito").bold());
    if frame.total_items > 0 {
        header.push_str(&format!(" {}", style(format!("[{}]", frame.total_items)).blue().bold()));
    }
    if frame.phase == PanelPhase::Closing {
        header.push_str(&format!(" {}", style("(closing)").dim()));
    }
    output.push_str(&header);
    output.push('\n');

    if frame.is_empty() {
        output.push_str(&format!("🛍️  {}\n", style("Tu carrito está vacío").dim()));
        output.push_str(&format!("{}\n", style("Agrega productos para comenzar").dim()));
        return output;
    }

    output.push_str(&format_cart_table(&frame.lines));
    output.push('\n');
    output.push_str(&format!(
        "{}: {}\n",
        style("Total productos").bold(),
        style(frame.total_items).green()
    ));
    output.push_str(&format!(
        "{}: {}\n",
        style("Total").bold(),
        style(format_price(&frame.total_price)).green()
    ));

    output
}

pub fn format_price(amount: &BigDecimal) -> String {
    format!("${}", amount.round(2).with_scale(2))
}

pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn frame(phase: PanelPhase, lines: Vec<LineView>) -> PanelFrame {
        let total_items = lines.iter().map(|l| u64::from(l.quantity)).sum();
        PanelFrame {
            phase,
            total_items,
            total_price: BigDecimal::from(0),
            lines,
        }
    }

    fn line(name: &str) -> LineView {
        LineView {
            position: 1,
            id: "a".to_string(),
            name: name.to_string(),
            image_src: String::new(),
            price: BigDecimal::from(5),
            quantity: 2,
            line_total: BigDecimal::from(10),
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(&BigDecimal::from(10)), "$10.00");
        assert_eq!(format_price(&BigDecimal::from_str("18.5").unwrap()), "$18.50");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Café", 30), "Café");
        assert_eq!(truncate("ñññññññññ", 6), "ñññ...");
    }

    #[test]
    fn test_hidden_panel_renders_nothing() {
        assert!(format_panel(&frame(PanelPhase::Hidden, vec![line("Miel")])).is_empty());
    }

    #[test]
    fn test_empty_panel_shows_placeholder() {
        let output = format_panel(&frame(PanelPhase::Open, vec![]));
        assert!(output.contains("Tu carrito está vacío"));
    }

    #[test]
    fn test_panel_lists_items() {
        let output = format_panel(&frame(PanelPhase::Open, vec![line("Miel")]));
        assert!(output.contains("Miel"));
        assert!(output.contains("$10.00"));
        assert!(output.contains("Total productos"));
    }
}
