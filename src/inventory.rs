//! Inventory operations over the full table.
//!
//! Every operation loads the whole table through the [`StoreAdapter`]. Mutations
//! change it in memory and write the whole table back. There is no row-level
//! update and no version check, so concurrent writers are last-write-wins.

use crate::error::{InventoryError, Result};
use crate::models::{InventoryItem, Table};
use crate::session::Session;
use crate::sizes::size_options;
use crate::store::StoreAdapter;

/// How many products the best-seller ranking keeps
pub const TOP_SELLERS: usize = 5;

/// A merchandise line to be added
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub category: String,
    pub product: String,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub price: u32,
}

impl NewProduct {
    /// Trims the text fields and checks the product can be stocked.
    fn validated(&self) -> Result<NewProduct> {
        let category = self.category.trim();
        let product = self.product.trim();
        let size = self.size.trim();
        let color = self.color.trim();

        let missing: Vec<&str> = [
            ("categoria", category),
            ("producto", product),
            ("talla", size),
            ("color", color),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();
        if !missing.is_empty() {
            return Err(InventoryError::Validation(format!(
                "Complete todos los campos obligatorios: {}",
                missing.join(", ")
            )));
        }

        if self.quantity == 0 {
            return Err(InventoryError::Validation(
                "La cantidad debe ser al menos 1".to_string(),
            ));
        }

        let options = size_options(category);
        if !options.iter().any(|option| option.eq_ignore_ascii_case(size)) {
            return Err(InventoryError::Validation(format!(
                "Talla '{size}' no válida para '{category}' (opciones: {})",
                options.join(", ")
            )));
        }

        Ok(NewProduct {
            category: category.to_string(),
            product: product.to_string(),
            size: size.to_uppercase(),
            color: color.to_string(),
            quantity: self.quantity,
            price: self.price,
        })
    }
}

/// One entry of the best-seller ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopSeller {
    pub product: String,
    pub sold: i64,
}

/// Financial summary of the table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Σ sold × price
    pub total_revenue: i64,
    /// Σ stock
    pub total_stock: i64,
    /// Σ stock × price
    pub inventory_value: i64,
    /// Best sellers by units sold, highest first
    pub top_sellers: Vec<TopSeller>,
}

impl Metrics {
    pub fn from_table(table: &Table) -> Self {
        let mut ranked: Vec<&InventoryItem> = table.items.iter().collect();
        // Stable sort: ties keep table order
        ranked.sort_by(|a, b| b.sold.cmp(&a.sold));

        let total = |value: fn(&InventoryItem) -> i64| {
            table
                .items
                .iter()
                .map(value)
                .fold(0i64, i64::saturating_add)
        };

        Self {
            total_revenue: total(InventoryItem::revenue),
            total_stock: total(|item| item.stock),
            inventory_value: total(InventoryItem::stock_value),
            top_sellers: ranked
                .into_iter()
                .take(TOP_SELLERS)
                .map(|item| TopSeller {
                    product: item.product.clone(),
                    sold: item.sold,
                })
                .collect(),
        }
    }
}

/// Rows matching a product-name search, or every row in stock when there is no search.
///
/// The search is a case-insensitive substring match and also returns rows
/// that are out of stock.
pub fn filter_items(table: &Table, search: Option<&str>) -> Vec<InventoryItem> {
    match search.filter(|s| !s.is_empty()) {
        Some(search) => {
            let needle = search.to_lowercase();
            table
                .items
                .iter()
                .filter(|item| item.product.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        }
        None => table
            .items
            .iter()
            .filter(|item| item.stock > 0)
            .cloned()
            .collect(),
    }
}

/// Inventory operations against one worksheet of one spreadsheet
pub struct InventoryService {
    store: StoreAdapter,
    spreadsheet: String,
    worksheet: String,
}

impl InventoryService {
    pub fn new(store: StoreAdapter, spreadsheet: impl Into<String>, worksheet: impl Into<String>) -> Self {
        Self {
            store,
            spreadsheet: spreadsheet.into(),
            worksheet: worksheet.into(),
        }
    }

    pub fn spreadsheet(&self) -> &str {
        &self.spreadsheet
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    /// Loads the full table. Store failures leave a notice and an empty table.
    pub fn load(&self, session: &mut Session) -> Table {
        self.store
            .read(&self.spreadsheet, &self.worksheet, &mut session.notices)
    }

    /// Loads the table that a mutation will write back.
    ///
    /// A failed load is an error here: writing back the empty stand-in
    /// would wipe the stored table.
    fn load_for_update(&self, session: &mut Session) -> Result<Table> {
        self.store
            .try_read(&self.spreadsheet, &self.worksheet, &mut session.notices)
            .ok_or_else(|| {
                InventoryError::LoadFailed(format!("{}/{}", self.spreadsheet, self.worksheet))
            })
    }

    /// Writes the full table back, replacing what the store held.
    fn save(&self, session: &mut Session, table: &Table) -> Result<()> {
        if !self
            .store
            .write(&self.spreadsheet, &self.worksheet, table, &mut session.notices)
        {
            return Err(InventoryError::SaveFailed(format!(
                "{}/{}",
                self.spreadsheet, self.worksheet
            )));
        }
        session.mark_saved();
        session.notices.success("Datos guardados");
        Ok(())
    }

    pub fn list(&self, session: &mut Session, search: Option<&str>) -> Vec<InventoryItem> {
        let table = self.load(session);
        let items = filter_items(&table, search);
        log::debug!("{} of {} rows listed", items.len(), table.len());
        items
    }

    /// Registers the sale of one unit of item `id`.
    ///
    /// Stock is not floored at zero, an oversold line goes negative.
    pub fn sell(&self, session: &mut Session, id: i64) -> Result<InventoryItem> {
        let mut table = self.load_for_update(session)?;
        let item = table.find_mut(id).ok_or(InventoryError::ItemNotFound(id))?;
        item.sold = item.sold.saturating_add(1);
        item.stock = item.stock.saturating_sub(1);
        let sold = item.clone();
        if sold.stock < 0 {
            session.notices.warning(format!(
                "'{}' (ID {}) vendido sin stock, stock actual {}",
                sold.product, sold.id, sold.stock
            ));
        }

        self.save(session, &table)?;
        log::info!("Sold one '{}' (ID {}), {} left", sold.product, sold.id, sold.stock);
        Ok(sold)
    }

    /// Appends a new merchandise line. Requires an admin session.
    pub fn add_product(&self, session: &mut Session, new: &NewProduct) -> Result<InventoryItem> {
        if !session.is_admin() {
            return Err(InventoryError::Unauthorized);
        }
        let new = new.validated()?;

        let mut table = self.load_for_update(session)?;
        let item = InventoryItem {
            id: table.next_id(),
            category: new.category,
            product: new.product,
            size: new.size,
            color: new.color,
            received: i64::from(new.quantity),
            sold: 0,
            stock: i64::from(new.quantity),
            price: i64::from(new.price),
        };
        table.items.push(item.clone());

        self.save(session, &table)?;
        log::info!("Added '{}' with ID {}", item.product, item.id);
        Ok(item)
    }

    pub fn metrics(&self, session: &mut Session) -> Metrics {
        Metrics::from_table(&self.load(session))
    }

    /// Categories already in use, in first-seen order
    pub fn categories(&self, session: &mut Session) -> Vec<String> {
        self.load(session).categories()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Sha256Password;
    use crate::session::NoticeLevel;
    use crate::store::MemoryStore;

    fn item(id: i64, product: &str, stock: i64, sold: i64, price: i64) -> InventoryItem {
        InventoryItem {
            id,
            category: "Camisas".to_string(),
            product: product.to_string(),
            size: "M".to_string(),
            color: "Azul".to_string(),
            received: stock.saturating_add(sold),
            sold,
            stock,
            price,
        }
    }

    fn new_product(category: &str, product: &str, size: &str, color: &str) -> NewProduct {
        NewProduct {
            category: category.to_string(),
            product: product.to_string(),
            size: size.to_string(),
            color: color.to_string(),
            quantity: 10,
            price: 60000,
        }
    }

    fn service_with(table: &Table) -> InventoryService {
        let store = MemoryStore::new().with_rows("Inventario", "Sheet1", table.to_grid());
        InventoryService::new(StoreAdapter::new(Box::new(store)), "Inventario", "Sheet1")
    }

    fn admin() -> Session {
        let mut session = Session::new();
        session.login(&Sha256Password::default(), "admin123");
        session
    }

    // ==================== filter_items ====================

    #[test]
    fn filter_without_search_keeps_items_in_stock() {
        let table = Table::new(vec![
            item(1, "Camisa Polo", 3, 0, 1),
            item(2, "Camisa Lino", 0, 2, 1),
            item(3, "Jean", -1, 4, 1),
        ]);
        let ids: Vec<i64> = filter_items(&table, None).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1]);
        // Empty search behaves like no search
        assert_eq!(filter_items(&table, Some("")).len(), 1);
    }

    #[test]
    fn filter_search_is_case_insensitive_and_ignores_stock() {
        let table = Table::new(vec![
            item(1, "Camisa Polo", 3, 0, 1),
            item(2, "camisa lino", 0, 2, 1),
            item(3, "Jean Slim", 5, 0, 1),
        ]);
        let ids: Vec<i64> = filter_items(&table, Some("CAMISA")).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(filter_items(&table, Some("short")).is_empty());
    }

    // ==================== Metrics ====================

    #[test]
    fn metrics_total_revenue() {
        let table = Table::new(vec![
            item(1, "A", 0, 2, 100000),
            item(2, "B", 0, 1, 50000),
        ]);
        assert_eq!(Metrics::from_table(&table).total_revenue, 250000);
    }

    #[test]
    fn metrics_stock_and_value_include_negative_stock() {
        let table = Table::new(vec![
            item(1, "A", 4, 0, 10),
            item(2, "B", -1, 3, 100),
        ]);
        let metrics = Metrics::from_table(&table);
        assert_eq!(metrics.total_stock, 3);
        assert_eq!(metrics.inventory_value, 40 - 100);
    }

    #[test]
    fn metrics_top_sellers_ranked_and_capped() {
        let table = Table::new(vec![
            item(1, "A", 0, 1, 1),
            item(2, "B", 0, 7, 1),
            item(3, "C", 0, 3, 1),
            item(4, "D", 0, 3, 1),
            item(5, "E", 0, 0, 1),
            item(6, "F", 0, 9, 1),
            item(7, "G", 0, 2, 1),
        ]);
        let top: Vec<(String, i64)> = Metrics::from_table(&table)
            .top_sellers
            .into_iter()
            .map(|t| (t.product, t.sold))
            .collect();
        assert_eq!(
            top,
            vec![
                ("F".to_string(), 9),
                ("B".to_string(), 7),
                ("C".to_string(), 3),
                ("D".to_string(), 3),
                ("G".to_string(), 2),
            ]
        );
    }

    #[test]
    fn metrics_saturate_instead_of_overflowing() {
        let table = Table::new(vec![
            item(1, "A", 1, i64::MAX, 2),
            item(2, "B", i64::MAX, 3, 5),
        ]);
        let metrics = Metrics::from_table(&table);
        assert_eq!(metrics.total_revenue, i64::MAX);
        assert_eq!(metrics.total_stock, i64::MAX);
        assert_eq!(metrics.inventory_value, i64::MAX);
    }

    #[test]
    fn metrics_empty_table() {
        assert_eq!(Metrics::from_table(&Table::default()), Metrics::default());
    }

    // ==================== sell ====================

    #[test]
    fn sell_updates_sold_and_stock_and_persists() {
        let service = service_with(&Table::new(vec![item(1, "Camisa Polo", 3, 0, 60000)]));
        let mut session = Session::new();

        let sold = service.sell(&mut session, 1).unwrap();
        assert_eq!((sold.sold, sold.stock), (1, 2));

        let reloaded = service.load(&mut session);
        assert_eq!(reloaded.find(1).unwrap().stock, 2);
        assert!(session.last_update().is_some());
    }

    #[test]
    fn sell_unknown_id_leaves_table_untouched() {
        let table = Table::new(vec![item(1, "Camisa Polo", 3, 0, 60000)]);
        let service = service_with(&table);
        let mut session = Session::new();

        match service.sell(&mut session, 99) {
            Err(InventoryError::ItemNotFound(99)) => {}
            other => panic!("Expected ItemNotFound, got: {other:?}"),
        }
        assert_eq!(service.load(&mut session), table);
        assert!(session.last_update().is_none());
    }

    #[test]
    fn sell_allows_negative_stock() {
        let service = service_with(&Table::new(vec![item(1, "Camisa Polo", 0, 5, 60000)]));
        let mut session = Session::new();

        let sold = service.sell(&mut session, 1).unwrap();
        assert_eq!(sold.stock, -1);
        assert_eq!(sold.sold, 6);
        assert!(session
            .notices
            .iter()
            .any(|n| n.level == NoticeLevel::Warning && n.message.contains("sin stock")));
    }

    #[test]
    fn sell_after_failed_load_writes_nothing() {
        let table = Table::new(vec![item(1, "Camisa Polo", 3, 0, 60000)]);
        let store = MemoryStore::new().with_rows("Inventario", "Sheet1", table.to_grid());
        let service =
            InventoryService::new(StoreAdapter::new(Box::new(store.clone())), "Inventario", "Sheet1");
        let mut session = Session::new();

        store.set_failing_reads(true);
        match service.sell(&mut session, 1) {
            Err(InventoryError::LoadFailed(_)) => {}
            other => panic!("Expected LoadFailed, got: {other:?}"),
        }
        assert!(session.notices.has_errors());
        assert_eq!(store.rows("Inventario", "Sheet1"), Some(table.to_grid()));
    }

    #[test]
    fn sell_reports_failed_save() {
        let store = MemoryStore::failing_writes().with_rows(
            "Inventario",
            "Sheet1",
            Table::new(vec![item(1, "Camisa Polo", 3, 0, 1)]).to_grid(),
        );
        let service = InventoryService::new(StoreAdapter::new(Box::new(store)), "Inventario", "Sheet1");
        let mut session = Session::new();

        assert!(matches!(
            service.sell(&mut session, 1),
            Err(InventoryError::SaveFailed(_))
        ));
        assert!(session.notices.has_errors());
        assert!(session.last_update().is_none());
    }

    // ==================== add_product ====================

    #[test]
    fn add_product_after_failed_load_keeps_stored_rows() {
        let table = Table::new(
            (1..=20)
                .map(|id| item(id, &format!("Camisa {id}"), 2, 1, 50000))
                .collect(),
        );
        let store = MemoryStore::new().with_rows("Inventario", "Sheet1", table.to_grid());
        let service =
            InventoryService::new(StoreAdapter::new(Box::new(store.clone())), "Inventario", "Sheet1");
        let mut session = admin();

        store.set_failing_reads(true);
        let result = service.add_product(&mut session, &new_product("Camisas", "Polo", "M", "Azul"));
        assert!(matches!(result, Err(InventoryError::LoadFailed(_))));
        assert!(session.last_update().is_none());

        // The stored table still has all 20 rows once reads recover
        store.set_failing_reads(false);
        assert_eq!(service.load(&mut session), table);
        assert_eq!(
            service
                .add_product(&mut session, &new_product("Camisas", "Polo", "M", "Azul"))
                .unwrap()
                .id,
            21
        );
    }

    #[test]
    fn add_product_requires_admin() {
        let service = service_with(&Table::default());
        let mut session = Session::new();

        let result = service.add_product(&mut session, &new_product("Camisas", "Polo", "M", "Azul"));
        assert!(matches!(result, Err(InventoryError::Unauthorized)));
    }

    #[test]
    fn add_product_rejects_empty_fields_without_mutation() {
        let table = Table::new(vec![item(7, "Camisa Polo", 3, 0, 1)]);
        let service = service_with(&table);
        let mut session = admin();

        for bad in [
            new_product("", "Polo", "M", "Azul"),
            new_product("Camisas", "", "M", "Azul"),
            new_product("Camisas", "Polo", "", "Azul"),
            new_product("Camisas", "Polo", "M", "   "),
        ] {
            let result = service.add_product(&mut session, &bad);
            assert!(matches!(result, Err(InventoryError::Validation(_))), "{bad:?}");
        }
        assert_eq!(service.load(&mut session), table);
        assert_eq!(service.load(&mut session).next_id(), 8);
    }

    #[test]
    fn add_product_rejects_zero_quantity_and_wrong_size() {
        let service = service_with(&Table::default());
        let mut session = admin();

        let mut zero = new_product("Camisas", "Polo", "M", "Azul");
        zero.quantity = 0;
        assert!(matches!(
            service.add_product(&mut session, &zero),
            Err(InventoryError::Validation(_))
        ));

        let letter_on_trousers = new_product("Pantalones", "Jean", "M", "Azul");
        assert!(matches!(
            service.add_product(&mut session, &letter_on_trousers),
            Err(InventoryError::Validation(_))
        ));
        assert!(service.load(&mut session).is_empty());
    }

    #[test]
    fn add_product_on_empty_table_gets_id_one() {
        let service = service_with(&Table::default());
        let mut session = admin();

        let added = service
            .add_product(&mut session, &new_product("Camisas", "Camisa Polo", "m", "Azul"))
            .unwrap();
        assert_eq!(added.id, 1);
        assert_eq!(added.size, "M");
        assert_eq!((added.received, added.sold, added.stock), (10, 0, 10));
    }

    #[test]
    fn add_product_after_max_id() {
        let service = service_with(&Table::new(vec![
            item(7, "A", 1, 0, 1),
            item(2, "B", 1, 0, 1),
        ]));
        let mut session = admin();

        let added = service
            .add_product(&mut session, &new_product("Shorts", "Short Playa", "32", "Rojo"))
            .unwrap();
        assert_eq!(added.id, 8);
        assert_eq!(service.load(&mut session).len(), 3);
    }

    #[test]
    fn categories_come_from_table() {
        let service = service_with(&Table::new(vec![item(1, "A", 1, 0, 1)]));
        let mut session = Session::new();
        assert_eq!(service.categories(&mut session), vec!["Camisas".to_string()]);
    }
}
