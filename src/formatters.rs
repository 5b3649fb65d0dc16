use chrono::{DateTime, Local};

use crate::inventory::Metrics;
use crate::models::InventoryItem;
use crate::session::Notice;

/// Formats whole currency units with thousands separators, e.g. `$250,000`.
pub fn format_money(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// One-line summary of an item, as shown in the sales list
pub fn format_item_line(item: &InventoryItem) -> String {
    format!(
        "[{}] {} | {} | Talla {} | Stock: {}",
        item.id, item.product, item.color, item.size, item.stock
    )
}

pub fn format_item_list(items: &[InventoryItem]) -> String {
    if items.is_empty() {
        return "No se encontraron productos con stock disponible\n".to_string();
    }

    let mut output = format!("{} productos encontrados\n\n", items.len());
    for item in items {
        output.push_str(&format_item_line(item));
        output.push('\n');
        output.push_str(&format!(
            "    Categoría: {} - Precio: {} - Ventas acumuladas: {}\n",
            item.category,
            format_money(item.price),
            item.sold
        ));
    }
    output
}

pub fn format_report(metrics: &Metrics, last_update: Option<DateTime<Local>>) -> String {
    let mut output = String::new();

    output.push_str("Reporte Financiero\n");
    output.push_str("------------------\n");
    output.push_str(&format!(
        "Ingresos Totales: {}\n",
        format_money(metrics.total_revenue)
    ));
    output.push_str(&format!("Stock Total:      {}\n", metrics.total_stock));
    output.push_str(&format!(
        "Valor Inventario: {}\n",
        format_money(metrics.inventory_value)
    ));

    if !metrics.top_sellers.is_empty() {
        let width = metrics
            .top_sellers
            .iter()
            .map(|t| t.product.chars().count())
            .max()
            .unwrap_or(0);
        output.push_str("\nProductos Más Vendidos\n");
        for (rank, seller) in metrics.top_sellers.iter().enumerate() {
            output.push_str(&format!(
                "{:>2}. {:<width$}  {}\n",
                rank + 1,
                seller.product,
                seller.sold
            ));
        }
    }

    if let Some(at) = last_update {
        output.push_str(&format!(
            "\nÚltima actualización: {}\n",
            at.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    output
}

pub fn format_notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| format!("[{}] {}\n", n.level.as_str(), n.message))
        .collect()
}
