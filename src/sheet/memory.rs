//! In-process table, for tests and callers embedding the scanner.

use super::TabularStore;
use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySheet {
    rows: Vec<Vec<String>>,
    writes: Vec<(usize, usize, String)>,
}

impl MemorySheet {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows, writes: Vec::new() }
    }

    /// Builds a sheet from string slices, header first.
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self::new(rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect())
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Every `write_cell` call in order, as `(row, col, value)`.
    pub fn writes(&self) -> &[(usize, usize, String)] {
        &self.writes
    }

    /// Reads a 1-based cell; missing cells read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        row.checked_sub(1)
            .and_then(|r| self.rows.get(r))
            .and_then(|r| col.checked_sub(1).and_then(|c| r.get(c)))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Grows `rows` as needed and sets the 1-based cell.
pub(crate) fn set_cell(rows: &mut Vec<Vec<String>>, row: usize, col: usize, value: &str) {
    if rows.len() < row {
        rows.resize(row, Vec::new());
    }
    let cells = &mut rows[row - 1];
    if cells.len() < col {
        cells.resize(col, String::new());
    }
    cells[col - 1] = value.to_string();
}

#[async_trait]
impl TabularStore for MemorySheet {
    async fn read_all_rows(&mut self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }

    async fn write_cell(&mut self, row: usize, col: usize, value: &str) -> Result<()> {
        if row == 0 || col == 0 {
            anyhow::bail!("Cell addresses are 1-based, got ({}, {})", row, col);
        }
        set_cell(&mut self.rows, row, col, value);
        self.writes.push((row, col, value.to_string()));
        Ok(())
    }
}
