//! Walks the item sheet, pricing each item at the first store that has it.

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::lookup::{Quote, StoreLookup};
use crate::sheet::{Columns, TabularStore};
use crate::stores::StoreProfile;
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

/// Written to the price column when no store has the item.
pub const NOT_AVAILABLE: &str = "N/A";

/// What happened to one sheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowOutcome {
    /// 1-based sheet row
    pub row: usize,
    pub item: String,
    pub quote: Quote,
}

impl RowOutcome {
    pub fn is_priced(&self) -> bool {
        self.quote.price.is_some()
    }
}

impl std::fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.quote.store_name, self.quote.price) {
            (Some(store), Some(price)) => {
                write!(f, "Row {}, {} -> {}:{}", self.row, self.item, store, format_price(price))
            }
            _ => write!(f, "Row {}, {} -> {}", self.row, self.item, NOT_AVAILABLE),
        }
    }
}

/// Summary of a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub rows: Vec<RowOutcome>,
    /// Rows with a blank item name
    pub skipped: usize,
}

impl ScanReport {
    pub fn priced(&self) -> usize {
        self.rows.iter().filter(|r| r.is_priced()).count()
    }

    pub fn unavailable(&self) -> usize {
        self.rows.len() - self.priced()
    }
}

/// Formats a price for the sheet.
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// Items × stores, first success wins.
pub struct CatalogScanner {
    stores: Vec<StoreProfile>,
    strategies: Vec<Box<dyn Fetcher>>,
    columns: Columns,
    require_positive: bool,
}

impl CatalogScanner {
    pub fn new(
        stores: Vec<StoreProfile>,
        strategies: Vec<Box<dyn Fetcher>>,
        columns: Columns,
        require_positive: bool,
    ) -> Self {
        Self { stores, strategies, columns, require_positive }
    }

    /// Uses the stores, columns and price policy from `config`.
    pub fn from_config(config: &Config, strategies: Vec<Box<dyn Fetcher>>) -> Self {
        Self::new(config.stores.clone(), strategies, config.columns, config.require_positive_price)
    }

    pub fn stores(&self) -> &[StoreProfile] {
        &self.stores
    }

    /// Tries each store in order and returns the first successful quote.
    pub async fn price_item(&self, item: &str) -> Quote {
        let lookup = StoreLookup::new(&self.strategies, self.require_positive);

        for store in &self.stores {
            let quote = lookup.lookup(item, store).await;
            if quote.is_success(self.require_positive) {
                return quote;
            }
        }

        info!("{}: not available at any store", item);
        Quote::empty()
    }

    /// Prices every item in `sheet` and writes the results back.
    ///
    /// `on_row` is called after each processed row. Fetchers are closed once
    /// the rows are done, whether or not the scan succeeded.
    pub async fn scan<F>(&self, sheet: &mut dyn TabularStore, on_row: F) -> Result<ScanReport>
    where
        F: FnMut(&RowOutcome) + Send,
    {
        let outcome = self.scan_rows(sheet, on_row).await;
        self.close().await;
        outcome
    }

    /// Releases fetcher resources (the browser session).
    pub async fn close(&self) {
        for fetcher in &self.strategies {
            fetcher.close().await;
        }
    }

    async fn scan_rows<F>(&self, sheet: &mut dyn TabularStore, mut on_row: F) -> Result<ScanReport>
    where
        F: FnMut(&RowOutcome) + Send,
    {
        self.columns.validate()?;

        let rows = sheet.read_all_rows().await?;
        let mut report = ScanReport::default();

        // Row 1 is the header
        for (index, cells) in rows.iter().enumerate().skip(1) {
            let row = index + 1;
            let item = cells.get(self.columns.name - 1).map(|c| c.trim()).unwrap_or_default();

            if item.is_empty() {
                debug!("Row {}: no item name, skipping", row);
                report.skipped += 1;
                continue;
            }

            let quote = self.price_item(item).await;
            self.write_quote(sheet, row, &quote).await?;
            sheet.flush().await?;

            let outcome = RowOutcome { row, item: item.to_string(), quote };
            on_row(&outcome);
            report.rows.push(outcome);
        }

        info!(
            "Scan finished: {} priced, {} not available, {} skipped",
            report.priced(),
            report.unavailable(),
            report.skipped
        );
        Ok(report)
    }

    async fn write_quote(&self, sheet: &mut dyn TabularStore, row: usize, quote: &Quote) -> Result<()> {
        let cols = self.columns;

        match (&quote.store_name, quote.price) {
            (Some(store), Some(price)) => {
                let url = quote.source_url.as_ref().map(|u| u.as_str()).unwrap_or_default();
                sheet.write_cell(row, cols.store, store).await?;
                sheet.write_cell(row, cols.url, url).await?;
                sheet.write_cell(row, cols.price, &format_price(price)).await?;
            }
            _ => {
                sheet.write_cell(row, cols.store, "").await?;
                sheet.write_cell(row, cols.url, "").await?;
                sheet.write_cell(row, cols.price, NOT_AVAILABLE).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Strategy;
    use crate::lookup::tests::{MockFetcher, Shared};
    use crate::sheet::MemorySheet;
    use async_trait::async_trait;
    use std::sync::Arc;

    const COLS: Columns = Columns { name: 1, store: 2, url: 3, price: 4 };

    fn store(name: &str, host: &str) -> StoreProfile {
        StoreProfile::new(
            name,
            format!("https://{}/search?q={{}}", host),
            &[".price"],
            &["meta[itemprop='price']"],
        )
    }

    fn listing(price: &str) -> String {
        format!(r#"<html><body><span class="price">{}</span></body></html>"#, price)
    }

    fn scanner(stores: Vec<StoreProfile>, fetchers: Vec<Box<dyn Fetcher>>) -> CatalogScanner {
        CatalogScanner::new(stores, fetchers, COLS, true)
    }

    #[tokio::test]
    async fn test_first_store_wins_and_second_is_never_queried() {
        let direct = Arc::new(
            MockFetcher::new(Strategy::Direct)
                .page("https://a.test/search?q=tofu", &listing("£2.00"))
                .page("https://b.test/search?q=tofu", &listing("£9.00")),
        );
        let scanner = scanner(
            vec![store("A", "a.test"), store("B", "b.test")],
            vec![Box::new(Shared(direct.clone()))],
        );

        let mut sheet = MemorySheet::from_rows(&[&["Item", "Store", "URL", "Price"], &["Tofu"]]);
        let report = scanner.scan(&mut sheet, |_| {}).await.unwrap();

        assert_eq!(sheet.cell(2, 2), "A");
        assert_eq!(sheet.cell(2, 3), "https://a.test/search?q=tofu");
        assert_eq!(sheet.cell(2, 4), "2.00");
        assert!(direct.requests().iter().all(|u| !u.contains("b.test")));
        assert_eq!(report.priced(), 1);
    }

    #[tokio::test]
    async fn test_falls_through_to_next_store() {
        let direct = MockFetcher::new(Strategy::Direct)
            .page("https://a.test/search?q=natto", &listing("Sold out"))
            .page("https://b.test/search?q=natto", &listing("£1.80"));
        let scanner = scanner(
            vec![store("A", "a.test"), store("B", "b.test")],
            vec![Box::new(direct)],
        );

        let quote = scanner.price_item("natto").await;
        assert_eq!(quote.store_name.as_deref(), Some("B"));
        assert_eq!(quote.price, Some(1.80));
    }

    #[tokio::test]
    async fn test_miss_writes_sentinel_and_clears_cells() {
        let direct = MockFetcher::failing(Strategy::Direct);
        let rendered = MockFetcher::failing(Strategy::Rendered);
        let scanner = scanner(
            vec![store("A", "a.test"), store("B", "b.test")],
            vec![Box::new(direct), Box::new(rendered)],
        );

        let mut sheet = MemorySheet::from_rows(&[
            &["Item", "Store", "URL", "Price"],
            &["Yuzu", "Old Store", "https://old.test/yuzu", "3.99"],
        ]);
        let mut lines = Vec::new();
        let report = scanner.scan(&mut sheet, |o| lines.push(o.to_string())).await.unwrap();

        assert_eq!(sheet.cell(2, 2), "");
        assert_eq!(sheet.cell(2, 3), "");
        assert_eq!(sheet.cell(2, 4), NOT_AVAILABLE);
        assert_eq!(lines, vec!["Row 2, Yuzu -> N/A"]);
        assert_eq!(report.unavailable(), 1);
    }

    #[tokio::test]
    async fn test_header_and_blank_names_are_skipped() {
        let direct = Arc::new(
            MockFetcher::new(Strategy::Direct).page("https://a.test/search?q=Nori", &listing("£4.50")),
        );
        let scanner = scanner(vec![store("A", "a.test")], vec![Box::new(Shared(direct.clone()))]);

        let mut sheet = MemorySheet::from_rows(&[
            &["Nori"],
            &["   "],
            &[],
            &["  Nori  "],
        ]);
        let mut lines = Vec::new();
        let report = scanner.scan(&mut sheet, |o| lines.push(o.to_string())).await.unwrap();

        // Header "Nori" is never looked up; blank rows get no writes
        assert!(sheet.writes().iter().all(|(row, _, _)| *row == 4));
        assert_eq!(direct.requests().len(), 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(lines, vec!["Row 4, Nori -> A:4.50"]);
    }

    #[tokio::test]
    async fn test_fetchers_closed_once_after_scan() {
        let direct = Arc::new(MockFetcher::failing(Strategy::Direct));
        let rendered = Arc::new(MockFetcher::failing(Strategy::Rendered));
        let scanner = scanner(
            vec![store("A", "a.test")],
            vec![Box::new(Shared(direct.clone())), Box::new(Shared(rendered.clone()))],
        );

        let mut sheet = MemorySheet::from_rows(&[&["Item"], &["Tofu"], &["Natto"]]);
        scanner.scan(&mut sheet, |_| {}).await.unwrap();

        assert_eq!(rendered.closes(), 1);
        assert_eq!(direct.closes(), 1);
    }

    struct BrokenSheet;

    #[async_trait]
    impl TabularStore for BrokenSheet {
        async fn read_all_rows(&mut self) -> Result<Vec<Vec<String>>> {
            Ok(vec![vec!["Item".into()], vec!["Tofu".into()]])
        }

        async fn write_cell(&mut self, _row: usize, _col: usize, _value: &str) -> Result<()> {
            anyhow::bail!("sheet went away")
        }
    }

    #[tokio::test]
    async fn test_fetchers_closed_when_scan_fails() {
        let rendered = Arc::new(MockFetcher::failing(Strategy::Rendered));
        let scanner = scanner(vec![store("A", "a.test")], vec![Box::new(Shared(rendered.clone()))]);

        let err = scanner.scan(&mut BrokenSheet, |_| {}).await.unwrap_err();
        assert!(err.to_string().contains("sheet went away"));
        assert_eq!(rendered.closes(), 1);
    }

    #[tokio::test]
    async fn test_invalid_columns_abort_before_lookups() {
        let direct = Arc::new(MockFetcher::failing(Strategy::Direct));
        let bad = Columns { name: 1, store: 1, url: 3, price: 4 };
        let scanner =
            CatalogScanner::new(vec![store("A", "a.test")], vec![Box::new(Shared(direct.clone()))], bad, true);

        let mut sheet = MemorySheet::from_rows(&[&["Item"], &["Tofu"]]);
        assert!(scanner.scan(&mut sheet, |_| {}).await.is_err());
        assert!(direct.requests().is_empty());
        assert_eq!(direct.closes(), 1);
    }

    #[test]
    fn test_report_counts_and_lines() {
        let priced = RowOutcome {
            row: 2,
            item: "Gochujang".into(),
            quote: Quote {
                store_name: Some("Korea Foods".into()),
                source_url: None,
                price: Some(5.0),
            },
        };
        let missing = RowOutcome { row: 3, item: "Yuzu".into(), quote: Quote::empty() };
        assert_eq!(priced.to_string(), "Row 2, Gochujang -> Korea Foods:5.00");
        assert_eq!(missing.to_string(), "Row 3, Yuzu -> N/A");

        let report = ScanReport { rows: vec![priced, missing], skipped: 1 };
        assert_eq!(report.priced(), 1);
        assert_eq!(report.unavailable(), 1);
    }
}
