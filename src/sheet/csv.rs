//! CSV file adapter. The file is loaded once and rewritten on flush.

use super::memory::set_cell;
use super::TabularStore;
use crate::error::ScrapeError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvSheet {
    path: PathBuf,
    rows: Vec<Vec<String>>,
    dirty: bool,
}

impl CsvSheet {
    /// Opens an existing CSV file. A missing file is a configuration error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(ScrapeError::config(format!("CSV file not found: {}", path.display())).into());
        }

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record =
                record.with_context(|| format!("Failed to read row {} of {}", i + 1, path.display()))?;
            rows.push(record.iter().map(String::from).collect());
        }

        debug!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(Self { path, rows, dirty: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TabularStore for CsvSheet {
    async fn read_all_rows(&mut self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }

    async fn write_cell(&mut self, row: usize, col: usize, value: &str) -> Result<()> {
        if row == 0 || col == 0 {
            anyhow::bail!("Cell addresses are 1-based, got ({}, {})", row, col);
        }
        set_cell(&mut self.rows, row, col, value);
        self.dirty = true;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let mut writer = ::csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to write CSV file: {}", self.path.display()))?;

        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        debug!("Wrote {} rows to {}", self.rows.len(), self.path.display());
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_round_trip_through_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Item,Store,Price\nGochujang,,\n\"Rice, sushi\",,").unwrap();

        let mut sheet = CsvSheet::open(file.path()).unwrap();
        let rows = sheet.read_all_rows().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0], "Rice, sushi");

        sheet.write_cell(2, 2, "Korea Foods").await.unwrap();
        sheet.write_cell(2, 3, "5.99").await.unwrap();
        sheet.write_cell(3, 5, "N/A").await.unwrap();
        sheet.flush().await.unwrap();

        let mut reopened = CsvSheet::open(file.path()).unwrap();
        let rows = reopened.read_all_rows().await.unwrap();
        assert_eq!(rows[1], vec!["Gochujang", "Korea Foods", "5.99"]);
        assert_eq!(rows[2], vec!["Rice, sushi", "", "", "", "N/A"]);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = CsvSheet::open("/nonexistent/items.csv").err().unwrap();
        let scrape = err.downcast_ref::<ScrapeError>().unwrap();
        assert!(scrape.is_fatal());
    }
}
