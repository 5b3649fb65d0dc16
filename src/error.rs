//! Error types for shop_inventory

use thiserror::Error;

/// Unified error type for store and inventory operations
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP error status code, with the response body when there was one
    #[error("HTTP error {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    /// Failed to parse a JSON payload
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Failed to read or write CSV data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Missing or unusable access credentials
    #[error("Credentials error: {0}")]
    Credentials(String),
    /// No spreadsheet with the given name is visible to the credentials
    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),
    /// The spreadsheet exists but has no worksheet with the given name
    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),
    /// A required field was empty or out of range
    #[error("Validation error: {0}")]
    Validation(String),
    /// No row with the given id
    #[error("Item not found: {0}")]
    ItemNotFound(i64),
    /// Admin session required
    #[error("Admin session required")]
    Unauthorized,
    /// The table could not be loaded, so it must not be written back
    #[error("Failed to load table {0}")]
    LoadFailed(String),
    /// The full-table write did not reach the store
    #[error("Failed to save table {0}")]
    SaveFailed(String),
}

/// Result alias for shop_inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
