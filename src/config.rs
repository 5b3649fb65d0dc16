//! Configuration file handling.
//!
//! Settings come from a TOML file, by default
//! `<config dir>/shop_inventory/config.toml`. A missing file means defaults.
//! The CLI overrides individual values on top.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::auth::{Sha256Password, DEFAULT_ADMIN_DIGEST};
use crate::error::Result;
use crate::store::sheets::{DEFAULT_DRIVE_BASE_URL, DEFAULT_SHEETS_BASE_URL};
use crate::store::{CsvFileStore, Credentials, SheetsStore, StoreAdapter, TableStore};

/// Which store backend holds the inventory table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Google Sheets spreadsheet, opened by name
    Sheets,
    /// Local directory of CSV files
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    /// Spreadsheet (store) name
    pub spreadsheet: String,
    /// Worksheet (table) name
    pub worksheet: String,
    /// Root directory of the CSV backend
    pub csv_dir: PathBuf,
    /// Service account key file (or a JSON secret with an `access_token` field)
    pub credentials_file: Option<PathBuf>,
    /// Environment variable whose access token, when set, is used instead of the file
    pub token_env: String,
    /// SHA-256 hex digest of the admin password
    pub admin_password_sha256: String,
    pub sheets_base_url: String,
    pub drive_base_url: String,
    /// Where `export` writes CSV files
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Sheets,
            spreadsheet: "Inventario Ropa Caballero".to_string(),
            worksheet: "Sheet1".to_string(),
            csv_dir: default_data_dir(),
            credentials_file: None,
            token_env: "GOOGLE_OAUTH_ACCESS_TOKEN".to_string(),
            admin_password_sha256: DEFAULT_ADMIN_DIGEST.to_string(),
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            drive_base_url: DEFAULT_DRIVE_BASE_URL.to_string(),
            export_dir: PathBuf::from("."),
        }
    }
}

/// Returns the default config path: ~/.config/shop_inventory/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shop_inventory")
        .join("config.toml")
}

/// Returns the default CSV root: ~/.local/share/shop_inventory
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shop_inventory")
}

impl Config {
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        log::info!("Config: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Builds the configured store backend behind a [`StoreAdapter`].
    ///
    /// The Sheets backend fails here if neither a token nor a key file is usable.
    pub fn open_store(&self) -> Result<StoreAdapter> {
        let backend: Box<dyn TableStore> = match self.backend {
            Backend::Sheets => {
                let credentials =
                    Credentials::resolve(&self.token_env, self.credentials_file.as_deref())?;
                Box::new(
                    SheetsStore::new(credentials)
                        .with_base_urls(&self.sheets_base_url, &self.drive_base_url),
                )
            }
            Backend::Csv => {
                log::info!("CSV store: {}", self.csv_dir.display());
                Box::new(CsvFileStore::new(&self.csv_dir))
            }
        };
        Ok(StoreAdapter::new(backend))
    }

    pub fn password_check(&self) -> Sha256Password {
        Sha256Password::new(&self.admin_password_sha256)
    }
}
