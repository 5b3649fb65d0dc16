//! CSV export of the full inventory table.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::Table;

/// File name for an export made on `date`, e.g. `inventario_20250115.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("inventario_{}.csv", date.format("%Y%m%d"))
}

/// Writes the table as CSV with the header row.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in table.to_grid() {
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Renders the table as a CSV string.
pub fn to_csv_string(table: &Table) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes `inventario_<date>.csv` into `dir` and returns its path.
pub fn export_to_dir(table: &Table, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(date));
    let file = std::fs::File::create(&path)?;
    write_csv(table, file)?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(path)
}
