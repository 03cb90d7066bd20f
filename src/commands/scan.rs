//! Scan command: price every item in the sheet and write the results back.

use super::build_strategies;
use crate::config::Config;
use crate::fetch::Fetcher;
use crate::format::Formatter;
use crate::scanner::CatalogScanner;
use crate::sheet::{google, CsvSheet, GoogleSheet, TabularStore};
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Where the item list lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSource {
    /// Local CSV file, rewritten in place
    Csv(PathBuf),
    /// The configured Google spreadsheet
    Google,
}

/// Executes a sheet scan.
pub struct ScanCommand {
    config: Config,
}

impl ScanCommand {
    /// Creates a new scan command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Validates configuration, opens the sheet and runs the scan.
    ///
    /// Configuration problems surface here, before any store is contacted.
    pub async fn execute(&self, source: &SheetSource) -> Result<String> {
        self.config.validate()?;

        let mut sheet = self.open(source)?;
        let strategies = build_strategies(&self.config)?;

        self.execute_with(sheet.as_mut(), strategies).await
    }

    /// Runs the scan against a provided sheet and fetchers (for testing).
    pub async fn execute_with(
        &self,
        sheet: &mut dyn TabularStore,
        strategies: Vec<Box<dyn Fetcher>>,
    ) -> Result<String> {
        let scanner = CatalogScanner::from_config(&self.config, strategies);
        info!("Scanning with {} stores", scanner.stores().len());

        // Progress goes to stderr so stdout stays parseable for json/csv output
        let report = scanner.scan(sheet, |outcome| eprintln!("{}", outcome)).await?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_report(&report))
    }

    fn open(&self, source: &SheetSource) -> Result<Box<dyn TabularStore>> {
        match source {
            SheetSource::Csv(path) => {
                info!("Using CSV sheet: {}", path.display());
                Ok(Box::new(CsvSheet::open(path)?))
            }
            SheetSource::Google => {
                let token = std::env::var(google::TOKEN_ENV).ok();
                let sheet = GoogleSheet::from_config(&self.config.sheet, token)?;
                info!("Using worksheet '{}'", self.config.sheet.worksheet);
                Ok(Box::new(sheet))
            }
        }
    }
}
