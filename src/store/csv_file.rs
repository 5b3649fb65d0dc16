//! Local CSV backend.
//!
//! A store is a directory under the root and each table is a CSV file in it:
//! `<root>/<store_name>/<table_name>.csv`.

use std::path::{Path, PathBuf};

use super::TableStore;
use crate::error::{InventoryError, Result};

#[derive(Debug, Clone)]
pub struct CsvFileStore {
    root: PathBuf,
}

impl CsvFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn store_dir(&self, store_name: &str) -> PathBuf {
        self.root.join(store_name)
    }

    /// Path of the CSV file backing a table
    pub fn table_path(&self, store_name: &str, table_name: &str) -> PathBuf {
        self.store_dir(store_name).join(format!("{table_name}.csv"))
    }
}

fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

impl TableStore for CsvFileStore {
    fn fetch_rows(&self, store_name: &str, table_name: &str) -> Result<Vec<Vec<String>>> {
        let dir = self.store_dir(store_name);
        if !dir.is_dir() {
            return Err(InventoryError::SpreadsheetNotFound(store_name.to_string()));
        }
        let path = self.table_path(store_name, table_name);
        if !path.is_file() {
            return Err(InventoryError::WorksheetNotFound(table_name.to_string()));
        }
        log::debug!("Reading CSV table: {}", path.display());
        read_rows(&path)
    }

    fn replace_rows(
        &self,
        store_name: &str,
        table_name: &str,
        rows: &[Vec<String>],
    ) -> Result<()> {
        std::fs::create_dir_all(self.store_dir(store_name))?;
        let path = self.table_path(store_name, table_name);
        log::debug!("Writing CSV table: {}", path.display());

        let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(&path)?;
        for row in rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn missing_store_dir_is_spreadsheet_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvFileStore::new(dir.path());
        match store.fetch_rows("Inventario", "Sheet1") {
            Err(InventoryError::SpreadsheetNotFound(name)) => assert_eq!(name, "Inventario"),
            other => panic!("Expected SpreadsheetNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn missing_table_file_is_worksheet_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Inventario")).unwrap();
        let store = CsvFileStore::new(dir.path());
        match store.fetch_rows("Inventario", "Sheet2") {
            Err(InventoryError::WorksheetNotFound(name)) => assert_eq!(name, "Sheet2"),
            other => panic!("Expected WorksheetNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn replace_then_fetch_returns_same_cells() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvFileStore::new(dir.path());
        let rows = grid(&[
            &["ID", "Producto", "Color"],
            &["1", "Camisa, manga larga", "Azul"],
            &["2", "Jean \"Slim\"", ""],
        ]);

        store.replace_rows("Inventario", "Sheet1", &rows).unwrap();
        assert!(store.table_path("Inventario", "Sheet1").is_file());
        assert_eq!(store.fetch_rows("Inventario", "Sheet1").unwrap(), rows);
    }

    #[test]
    fn replace_truncates_longer_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvFileStore::new(dir.path());
        let long = grid(&[&["ID"], &["1"], &["2"], &["3"]]);
        let short = grid(&[&["ID"], &["9"]]);

        store.replace_rows("Inventario", "Sheet1", &long).unwrap();
        store.replace_rows("Inventario", "Sheet1", &short).unwrap();

        assert_eq!(store.fetch_rows("Inventario", "Sheet1").unwrap(), short);
    }
}
