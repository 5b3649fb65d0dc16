//! Google Sheets backend.
//!
//! The spreadsheet is opened by name through the Drive files listing, then its
//! worksheet is read with `values.get` and replaced with `values:clear`
//! followed by `values.update` at `A1`.
//!
//! Cells are read unformatted and written `RAW`, so text such as `007` or
//! `3/4` is never reinterpreted by the sheet and display formats on the
//! numeric columns do not leak into the values.

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::google_auth::{Credentials, TokenSource};
use super::TableStore;
use crate::error::{InventoryError, Result};
use crate::models::NUMERIC_COLUMNS;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<Value>>,
}

/// Escapes a value for a single-quoted Drive query literal.
fn drive_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// A1 range covering a whole worksheet, e.g. `'Sheet1'`.
fn sheet_range(table_name: &str) -> String {
    format!("'{}'", table_name.replace('\'', "''"))
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Cells as JSON for a `RAW` write: integers in numeric columns become numbers,
/// everything else stays text so the sheet keeps it verbatim.
fn typed_rows(rows: &[Vec<String>]) -> Vec<Vec<Value>> {
    let numeric: Vec<bool> = rows
        .first()
        .map(|header| {
            header
                .iter()
                .map(|name| NUMERIC_COLUMNS.contains(&name.as_str()))
                .collect()
        })
        .unwrap_or_default();

    rows.iter()
        .enumerate()
        .map(|(row_index, row)| {
            row.iter()
                .enumerate()
                .map(|(col, cell)| {
                    let is_numeric = row_index > 0 && numeric.get(col).copied().unwrap_or(false);
                    match cell.parse::<i64>() {
                        Ok(n) if is_numeric => Value::from(n),
                        _ => Value::String(cell.clone()),
                    }
                })
                .collect()
        })
        .collect()
}

pub struct SheetsStore {
    client: Client,
    tokens: TokenSource,
    pub(crate) sheets_base_url: String,
    pub(crate) drive_base_url: String,
}

impl SheetsStore {
    pub fn new(credentials: Credentials) -> Self {
        log::debug!("Creating Sheets client");
        Self {
            client: Client::new(),
            tokens: TokenSource::new(credentials),
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            drive_base_url: DEFAULT_DRIVE_BASE_URL.to_string(),
        }
    }

    /// Points the client at other API roots (mock servers, proxies).
    pub fn with_base_urls(mut self, sheets: &str, drive: &str) -> Self {
        self.sheets_base_url = sheets.trim_end_matches('/').to_string();
        self.drive_base_url = drive.trim_end_matches('/').to_string();
        self
    }

    /// Turns a non-success response into an error, keeping its body.
    fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        log::debug!("Request failed with {status}: {body}");
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(InventoryError::Credentials(
                format!("{status}: {body}"),
            )),
            _ => Err(InventoryError::HttpStatus { status, body }),
        }
    }

    /// Looks up a spreadsheet's id by its exact name.
    pub fn find_spreadsheet_id(&self, name: &str) -> Result<String> {
        let url = format!("{}/files", self.drive_base_url);
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            drive_query_literal(name),
            SPREADSHEET_MIME_TYPE
        );
        log::debug!("Looking up spreadsheet '{name}' at {url}");

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.tokens.bearer(&self.client)?)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()?;
        let list: FileList = Self::check(response)?.json()?;

        list.files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| InventoryError::SpreadsheetNotFound(name.to_string()))
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.sheets_base_url,
            spreadsheet_id,
            urlencoding::encode(range)
        )
    }
}

impl TableStore for SheetsStore {
    fn fetch_rows(&self, store_name: &str, table_name: &str) -> Result<Vec<Vec<String>>> {
        let spreadsheet_id = self.find_spreadsheet_id(store_name)?;
        let url = self.values_url(&spreadsheet_id, &sheet_range(table_name));
        log::debug!("Fetching values from {url}");

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.tokens.bearer(&self.client)?)
            .query(&[("valueRenderOption", "UNFORMATTED_VALUE")])
            .send()?;
        let range: ValueRange = match Self::check(response) {
            Ok(response) => response.json()?,
            Err(InventoryError::HttpStatus { status, body })
                if status == StatusCode::BAD_REQUEST && body.contains("Unable to parse range") =>
            {
                return Err(InventoryError::WorksheetNotFound(table_name.to_string()));
            }
            Err(e) => return Err(e),
        };

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    fn replace_rows(
        &self,
        store_name: &str,
        table_name: &str,
        rows: &[Vec<String>],
    ) -> Result<()> {
        let spreadsheet_id = self.find_spreadsheet_id(store_name)?;
        let whole_sheet = sheet_range(table_name);

        let clear_url = format!("{}:clear", self.values_url(&spreadsheet_id, &whole_sheet));
        log::debug!("Clearing {clear_url}");
        let response = self
            .client
            .post(&clear_url)
            .bearer_auth(self.tokens.bearer(&self.client)?)
            .json(&serde_json::json!({}))
            .send()?;
        Self::check(response)?;

        let start = format!("{whole_sheet}!A1");
        let update_url = self.values_url(&spreadsheet_id, &start);
        log::debug!("Updating {} rows at {update_url}", rows.len());
        let response = self
            .client
            .put(&update_url)
            .bearer_auth(self.tokens.bearer(&self.client)?)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRangeUpdate {
                range: &start,
                major_dimension: "ROWS",
                values: typed_rows(rows),
            })
            .send()?;
        Self::check(response)?;
        Ok(())
    }
}
