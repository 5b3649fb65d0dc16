//! In-memory backend.
//!
//! Clones share the same tables and switches, so a test can keep a handle
//! on a store it has handed to a [`StoreAdapter`](super::StoreAdapter).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::TableStore;
use crate::error::{InventoryError, Result};

type Tables = HashMap<(String, String), Vec<Vec<String>>>;

/// Keeps tables in memory. Used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Rc<RefCell<Tables>>,
    fail_reads: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write fails, for exercising save errors.
    pub fn failing_writes() -> Self {
        let store = Self::default();
        store.fail_writes.set(true);
        store
    }

    /// Makes subsequent reads fail (or succeed again) as a lost connection would.
    pub fn set_failing_reads(&self, failing: bool) {
        self.fail_reads.set(failing);
    }

    /// Seeds a table with raw rows, header first.
    pub fn with_rows(self, store_name: &str, table_name: &str, rows: Vec<Vec<String>>) -> Self {
        self.tables
            .borrow_mut()
            .insert((store_name.to_string(), table_name.to_string()), rows);
        self
    }

    /// Current raw contents of a table, if it exists
    pub fn rows(&self, store_name: &str, table_name: &str) -> Option<Vec<Vec<String>>> {
        self.tables
            .borrow()
            .get(&(store_name.to_string(), table_name.to_string()))
            .cloned()
    }
}

impl TableStore for MemoryStore {
    fn fetch_rows(&self, store_name: &str, table_name: &str) -> Result<Vec<Vec<String>>> {
        if self.fail_reads.get() {
            return Err(InventoryError::HttpStatus {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: format!("{store_name}/{table_name} unavailable"),
            });
        }
        self.rows(store_name, table_name)
            .ok_or_else(|| InventoryError::SpreadsheetNotFound(store_name.to_string()))
    }

    fn replace_rows(
        &self,
        store_name: &str,
        table_name: &str,
        rows: &[Vec<String>],
    ) -> Result<()> {
        if self.fail_writes.get() {
            return Err(InventoryError::SaveFailed(format!(
                "{store_name}/{table_name}"
            )));
        }
        self.tables
            .borrow_mut()
            .insert((store_name.to_string(), table_name.to_string()), rows.to_vec());
        Ok(())
    }
}
