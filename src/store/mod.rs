//! Tabular store backends and the adapter that shields callers from their failures.
//!
//! A backend only moves raw cells. [`StoreAdapter`] turns them into a typed
//! [`Table`] and converts every backend error into a notice plus an empty
//! table or a `false` flag.

pub mod csv_file;
pub mod google_auth;
pub mod memory;
pub mod sheets;

pub use csv_file::CsvFileStore;
pub use memory::MemoryStore;
pub use google_auth::Credentials;
pub use sheets::SheetsStore;

use crate::error::{InventoryError, Result};
use crate::models::Table;
use crate::session::Notices;

/// A named collection of tables (a spreadsheet) holding named tables (worksheets).
pub trait TableStore {
    /// Returns every row of the table, header first.
    fn fetch_rows(&self, store_name: &str, table_name: &str) -> Result<Vec<Vec<String>>>;

    /// Replaces the table's whole contents with `rows`.
    fn replace_rows(
        &self,
        store_name: &str,
        table_name: &str,
        rows: &[Vec<String>],
    ) -> Result<()>;
}

/// Reads and writes whole inventory tables through a [`TableStore`].
pub struct StoreAdapter {
    backend: Box<dyn TableStore>,
}

impl StoreAdapter {
    pub fn new(backend: Box<dyn TableStore>) -> Self {
        Self { backend }
    }

    /// Loads a table. Any failure is reported and yields an empty table.
    pub fn read(&self, store_name: &str, table_name: &str, notices: &mut Notices) -> Table {
        self.try_read(store_name, table_name, notices)
            .unwrap_or_default()
    }

    /// Loads a table, returning `None` after reporting a failure.
    ///
    /// Unlike [`read`](Self::read) this keeps a failed load apart from an
    /// empty table, which matters before writing the table back.
    pub fn try_read(
        &self,
        store_name: &str,
        table_name: &str,
        notices: &mut Notices,
    ) -> Option<Table> {
        log::debug!("Reading {store_name}/{table_name}");
        match self.backend.fetch_rows(store_name, table_name) {
            Ok(rows) => {
                let table = Table::from_grid(&rows);
                log::info!("Loaded {} rows from {store_name}/{table_name}", table.len());
                Some(table)
            }
            Err(InventoryError::SpreadsheetNotFound(name)) => {
                notices.error(format!(
                    "No se encontró la hoja de cálculo '{name}'. Verifica el nombre."
                ));
                None
            }
            Err(e) => {
                notices.error(format!("Error al leer datos: {e}"));
                None
            }
        }
    }

    /// Replaces the stored table with `table`, header included.
    ///
    /// Returns `false` after reporting the failure if the write did not go through.
    pub fn write(
        &self,
        store_name: &str,
        table_name: &str,
        table: &Table,
        notices: &mut Notices,
    ) -> bool {
        let rows = table.to_grid();
        log::debug!("Writing {} rows to {store_name}/{table_name}", rows.len());
        match self.backend.replace_rows(store_name, table_name, &rows) {
            Ok(()) => {
                log::info!("Saved {} rows to {store_name}/{table_name}", table.len());
                true
            }
            Err(e) => {
                notices.error(format!("Error al guardar: {e}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InventoryItem;

    fn item(id: i64, product: &str, stock: i64) -> InventoryItem {
        InventoryItem {
            id,
            category: "Camisas".to_string(),
            product: product.to_string(),
            size: "M".to_string(),
            color: "Azul".to_string(),
            received: stock,
            sold: 0,
            stock,
            price: 50000,
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let adapter = StoreAdapter::new(Box::new(MemoryStore::new()));
        let mut notices = Notices::default();
        let table = Table::new(vec![item(1, "Camisa Polo", 4), item(2, "Camisa Lino", 0)]);

        assert!(adapter.write("Inventario", "Sheet1", &table, &mut notices));
        let loaded = adapter.read("Inventario", "Sheet1", &mut notices);

        assert_eq!(loaded, table);
        assert!(notices.is_empty());
    }

    #[test]
    fn read_missing_table_is_empty_with_notice() {
        let adapter = StoreAdapter::new(Box::new(MemoryStore::new()));
        let mut notices = Notices::default();

        let table = adapter.read("Nope", "Sheet1", &mut notices);

        assert!(table.is_empty());
        assert!(notices.has_errors());
    }

    #[test]
    fn try_read_tells_failure_from_empty() {
        let store = MemoryStore::new().with_rows("Inventario", "Sheet1", Table::default().to_grid());
        let adapter = StoreAdapter::new(Box::new(store.clone()));
        let mut notices = Notices::default();

        assert_eq!(adapter.try_read("Inventario", "Sheet1", &mut notices), Some(Table::default()));
        assert!(notices.is_empty());

        store.set_failing_reads(true);
        assert_eq!(adapter.try_read("Inventario", "Sheet1", &mut notices), None);
        assert!(notices.has_errors());
    }

    #[test]
    fn failed_write_reports_and_returns_false() {
        let adapter = StoreAdapter::new(Box::new(MemoryStore::failing_writes()));
        let mut notices = Notices::default();
        let table = Table::new(vec![item(1, "Camisa Polo", 4)]);

        assert!(!adapter.write("Inventario", "Sheet1", &table, &mut notices));
        assert!(notices.has_errors());
    }

    #[test]
    fn write_replaces_previous_contents() {
        let adapter = StoreAdapter::new(Box::new(MemoryStore::new()));
        let mut notices = Notices::default();
        let first = Table::new(vec![item(1, "A", 1), item(2, "B", 1), item(3, "C", 1)]);
        let second = Table::new(vec![item(9, "Z", 2)]);

        adapter.write("Inventario", "Sheet1", &first, &mut notices);
        adapter.write("Inventario", "Sheet1", &second, &mut notices);

        assert_eq!(adapter.read("Inventario", "Sheet1", &mut notices), second);
    }
}
