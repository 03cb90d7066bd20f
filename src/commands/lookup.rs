//! Lookup command: price a single item without touching any sheet.

use super::build_strategies;
use crate::config::Config;
use crate::fetch::Fetcher;
use crate::format::Formatter;
use crate::scanner::CatalogScanner;
use anyhow::{bail, Result};
use tracing::info;

/// Executes a one-off item lookup.
pub struct LookupCommand {
    config: Config,
}

impl LookupCommand {
    /// Creates a new lookup command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Looks the item up across all configured stores.
    pub async fn execute(&self, item: &str) -> Result<String> {
        self.config.validate()?;
        let strategies = build_strategies(&self.config)?;

        self.execute_with(strategies, item).await
    }

    /// Executes the lookup with provided fetchers (for testing).
    pub async fn execute_with(&self, strategies: Vec<Box<dyn Fetcher>>, item: &str) -> Result<String> {
        let item = item.trim();
        if item.is_empty() {
            bail!("Item name must not be empty");
        }

        info!("Looking up: {}", item);

        let scanner = CatalogScanner::from_config(&self.config, strategies);
        let quote = scanner.price_item(item).await;
        scanner.close().await;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_quote(item, &quote))
    }
}
