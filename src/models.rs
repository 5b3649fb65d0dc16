/// Column headers of the inventory table, in storage order.
pub const COLUMNS: [&str; 9] = [
    "ID",
    "Categoria",
    "Producto",
    "Talla",
    "Color",
    "Entrada",
    "Ventas",
    "Stock",
    "Precio",
];

/// Columns holding whole numbers
pub const NUMERIC_COLUMNS: [&str; 5] = ["ID", "Entrada", "Ventas", "Stock", "Precio"];

/// One merchandise line (one row of the inventory table)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub id: i64,
    pub category: String,
    pub product: String,
    pub size: String,
    pub color: String,
    /// Units ever received
    pub received: i64,
    /// Units ever sold
    pub sold: i64,
    /// Sellable units; may go negative after an oversell
    pub stock: i64,
    /// Unit price in whole currency units
    pub price: i64,
}

impl InventoryItem {
    /// Returns the row's cells in [`COLUMNS`] order.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.category.clone(),
            self.product.clone(),
            self.size.clone(),
            self.color.clone(),
            self.received.to_string(),
            self.sold.to_string(),
            self.stock.to_string(),
            self.price.to_string(),
        ]
    }

    /// Revenue this line has brought in so far
    pub fn revenue(&self) -> i64 {
        self.sold.saturating_mul(self.price)
    }

    /// Value of the units still on the shelf
    pub fn stock_value(&self) -> i64 {
        self.stock.saturating_mul(self.price)
    }
}

/// Parse a cell as an integer, returning 0 if parsing fails.
///
/// Accepts the forms a spreadsheet tends to hand back for whole numbers:
/// surrounding whitespace, `,` thousands separators and decimals, which are
/// truncated. Numbers outside the `i64` range count as unparseable.
pub fn coerce_int(cell: &str) -> i64 {
    let clean: String = cell.trim().chars().filter(|c| *c != ',').collect();
    if let Ok(value) = clean.parse::<i64>() {
        return value;
    }
    match clean.parse::<f64>() {
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        Ok(value) if value >= i64::MIN as f64 && value < i64::MAX as f64 => value.trunc() as i64,
        _ => 0,
    }
}

/// The full set of inventory rows: the unit of every read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub items: Vec<InventoryItem>,
}

impl Table {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Builds a table from raw cells, the first row being the header.
    ///
    /// Columns are matched by header name, so their order in the store does not
    /// matter. A missing column defaults to 0 (numeric) or "" (text), and a grid
    /// without an `ID` column, or with only a header, is an empty table.
    pub fn from_grid(grid: &[Vec<String>]) -> Self {
        let Some((header, rows)) = grid.split_first() else {
            return Self::default();
        };
        if rows.is_empty() {
            return Self::default();
        }

        let position = |name: &str| header.iter().position(|h| h.trim() == name);
        let Some(id_col) = position("ID") else {
            log::warn!("Table has no ID column, treating it as empty");
            return Self::default();
        };
        let columns: Vec<Option<usize>> = COLUMNS.iter().map(|name| position(name)).collect();

        let items = rows
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| {
                let text = |index: usize| {
                    columns[index]
                        .and_then(|col| row.get(col))
                        .cloned()
                        .unwrap_or_default()
                };
                let int = |index: usize| {
                    columns[index]
                        .and_then(|col| row.get(col))
                        .map(|cell| coerce_int(cell))
                        .unwrap_or(0)
                };
                InventoryItem {
                    id: row.get(id_col).map(|cell| coerce_int(cell)).unwrap_or(0),
                    category: text(1),
                    product: text(2),
                    size: text(3),
                    color: text(4),
                    received: int(5),
                    sold: int(6),
                    stock: int(7),
                    price: int(8),
                }
            })
            .collect();

        Self { items }
    }

    /// Renders the table as raw cells, header row first.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.items.len() + 1);
        grid.push(COLUMNS.iter().map(|c| c.to_string()).collect());
        grid.extend(self.items.iter().map(InventoryItem::to_record));
        grid
    }

    pub fn find(&self, id: i64) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn find_mut(&mut self, id: i64) -> Option<&mut InventoryItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Next id to hand out: one past the highest id, or 1 for an empty table.
    pub fn next_id(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.category) {
                seen.push(item.category.clone());
            }
        }
        seen
    }
}
