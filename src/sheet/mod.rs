//! Row/column addressed stores that hold the item list and receive prices.

pub mod csv;
pub mod google;
pub mod memory;

use crate::error::ScrapeError;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use self::csv::CsvSheet;
pub use google::GoogleSheet;
pub use memory::MemorySheet;

/// A spreadsheet-like table. Rows and columns are 1-based; row 1 is the header.
#[async_trait]
pub trait TabularStore: Send {
    /// Returns every row, header included, as cell text.
    async fn read_all_rows(&mut self) -> Result<Vec<Vec<String>>>;

    /// Sets one cell.
    async fn write_cell(&mut self, row: usize, col: usize, value: &str) -> Result<()>;

    /// Persists pending writes.
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// 1-based column positions of the fields the scanner reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Columns {
    /// Item name
    pub name: usize,
    /// Winning store name
    pub store: usize,
    /// Product page URL
    pub url: usize,
    /// Price or the "not available" marker
    pub price: usize,
}

impl Default for Columns {
    fn default() -> Self {
        // E, L, M, N
        Self { name: 5, store: 12, url: 13, price: 14 }
    }
}

impl Columns {
    pub fn validate(&self) -> Result<(), ScrapeError> {
        let all = [("name", self.name), ("store", self.store), ("url", self.url), ("price", self.price)];

        if let Some((label, _)) = all.iter().find(|(_, col)| *col == 0) {
            return Err(ScrapeError::config(format!("{} column must be 1 or greater", label)));
        }

        for (i, (label, col)) in all.iter().enumerate() {
            if let Some((other, _)) = all[i + 1..].iter().find(|(_, c)| c == col) {
                return Err(ScrapeError::config(format!(
                    "{} and {} columns are both set to {}",
                    label, other, col
                )));
            }
        }

        Ok(())
    }
}

/// Converts a 1-based column number to letters (1 → A, 27 → AA).
pub fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
