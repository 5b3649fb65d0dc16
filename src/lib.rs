//! Shop Inventory - clothing store stock, sales and revenue
//!
//! Keeps a shop's merchandise lines in one spreadsheet-backed table. Sales,
//! new stock and the financial report all go through [`InventoryService`],
//! which reloads and rewrites the full table on every action.

pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod formatters;
pub mod inventory;
pub mod models;
pub mod session;
pub mod sizes;
pub mod store;

// Re-export commonly used items
pub use auth::{hash_password, CredentialCheck, Sha256Password};
pub use config::{Backend, Config};
pub use error::{InventoryError, Result};
pub use inventory::{filter_items, InventoryService, Metrics, NewProduct, TopSeller};
pub use models::{InventoryItem, Table, COLUMNS};
pub use session::{Notice, NoticeLevel, Session};
pub use sizes::size_options;
pub use store::{StoreAdapter, TableStore};
