//! Output formatting for quotes and scan reports (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::lookup::Quote;
use crate::scanner::{format_price, RowOutcome, ScanReport, NOT_AVAILABLE};
use crate::stores::StoreProfile;
use serde::Serialize;

/// Formats lookup results.
pub struct Formatter {
    format: OutputFormat,
}

#[derive(Serialize)]
struct ItemQuote<'a> {
    item: &'a str,
    #[serde(flatten)]
    quote: &'a Quote,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the best quote found for a single item.
    pub fn format_quote(&self, item: &str, quote: &Quote) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ItemQuote { item, quote })
                    .unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_single(item, quote),
            OutputFormat::Markdown => self.markdown_single(item, quote),
            OutputFormat::Csv => {
                let mut lines = vec![self.csv_header()];
                lines.push(Self::csv_line(None, item, quote));
                lines.join("\n")
            }
        }
    }

    /// Formats the outcome of a sheet scan.
    pub fn format_report(&self, report: &ScanReport) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_report(report),
            OutputFormat::Markdown => self.markdown_report(report),
            OutputFormat::Csv => self.csv_report(&report.rows),
        }
    }

    /// Lists configured stores in priority order.
    pub fn format_stores(&self, stores: &[StoreProfile]) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(stores).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Markdown => {
                let mut lines = vec!["| # | Store | Search URL |".to_string()];
                lines.push("|---|-------|------------|".to_string());
                for (i, store) in stores.iter().enumerate() {
                    lines.push(format!("| {} | {} | {} |", i + 1, store.name, store.search_url));
                }
                lines.join("\n")
            }
            OutputFormat::Csv => {
                let mut lines = vec!["priority,store,search_url".to_string()];
                for (i, store) in stores.iter().enumerate() {
                    lines.push(format!(
                        "{},{},{}",
                        i + 1,
                        Self::csv_escape(&store.name),
                        Self::csv_escape(&store.search_url)
                    ));
                }
                lines.join("\n")
            }
            OutputFormat::Table => {
                let mut lines = vec![format!("{:<3} {:<22} {}", "#", "Store", "Search URL")];
                lines.push(format!("{:-<3} {:-<22} {:-<40}", "", "", ""));
                for (i, store) in stores.iter().enumerate() {
                    lines.push(format!("{:<3} {:<22} {}", i + 1, store.name, store.search_url));
                }
                lines.join("\n")
            }
        }
    }

    // Table formatting

    fn table_single(&self, item: &str, quote: &Quote) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Item:    {}", item));
        match (&quote.store_name, quote.price) {
            (Some(store), Some(price)) => {
                lines.push(format!("Store:   {}", store));
                lines.push(format!("Price:   {}", format_price(price)));
                if let Some(url) = &quote.source_url {
                    lines.push(format!("URL:     {}", url));
                }
            }
            _ => lines.push(format!("Price:   {}", NOT_AVAILABLE)),
        }

        lines.join("\n")
    }

    fn table_report(&self, report: &ScanReport) -> String {
        let row_width = 5;
        let item_width = 30;
        let store_width = 22;
        let price_width = 8;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<row_width$}  {:<item_width$}  {:<store_width$}  {:>price_width$}",
            "Row", "Item", "Store", "Price"
        ));
        lines.push(format!(
            "{:-<row_width$}  {:-<item_width$}  {:-<store_width$}  {:-<price_width$}",
            "", "", "", ""
        ));

        for outcome in &report.rows {
            let (store, price) = Self::cells(&outcome.quote);
            lines.push(format!(
                "{:<row_width$}  {:<item_width$}  {:<store_width$}  {:>price_width$}",
                outcome.row,
                truncate(&outcome.item, item_width),
                truncate(&store, store_width),
                price
            ));
        }

        lines.push(String::new());
        lines.push(Self::summary(report));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, item: &str, quote: &Quote) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", item));
        lines.push(String::new());

        match (&quote.store_name, quote.price) {
            (Some(store), Some(price)) => {
                lines.push(format!("- **Store:** {}", store));
                lines.push(format!("- **Price:** {}", format_price(price)));
                if let Some(url) = &quote.source_url {
                    lines.push(format!("- **URL:** [View product]({})", url));
                }
            }
            _ => lines.push(format!("- **Price:** {}", NOT_AVAILABLE)),
        }

        lines.join("\n")
    }

    fn markdown_report(&self, report: &ScanReport) -> String {
        let mut lines = Vec::new();

        lines.push("| Row | Item | Store | Price |".to_string());
        lines.push("|-----|------|-------|-------|".to_string());

        for outcome in &report.rows {
            let (store, price) = Self::cells(&outcome.quote);
            let store = match &outcome.quote.source_url {
                Some(url) if !store.is_empty() => format!("[{}]({})", store, url),
                _ => store,
            };
            lines.push(format!("| {} | {} | {} | {} |", outcome.row, outcome.item, store, price));
        }

        lines.push(String::new());
        lines.push(format!("*{}*", Self::summary(report)));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "row,item,store,price,url".to_string()
    }

    fn csv_report(&self, rows: &[RowOutcome]) -> String {
        let mut lines = vec![self.csv_header()];
        for outcome in rows {
            lines.push(Self::csv_line(Some(outcome.row), &outcome.item, &outcome.quote));
        }
        lines.join("\n")
    }

    fn csv_line(row: Option<usize>, item: &str, quote: &Quote) -> String {
        let (store, price) = Self::cells(quote);
        let url = quote.source_url.as_ref().map(|u| u.to_string()).unwrap_or_default();
        format!(
            "{},{},{},{},{}",
            row.map(|r| r.to_string()).unwrap_or_default(),
            Self::csv_escape(item),
            Self::csv_escape(&store),
            price,
            Self::csv_escape(&url)
        )
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }

    /// Store and price cells as written to the sheet.
    fn cells(quote: &Quote) -> (String, String) {
        match (&quote.store_name, quote.price) {
            (Some(store), Some(price)) => (store.clone(), format_price(price)),
            _ => (String::new(), NOT_AVAILABLE.to_string()),
        }
    }

    fn summary(report: &ScanReport) -> String {
        format!(
            "{} priced, {} not available, {} skipped",
            report.priced(),
            report.unavailable(),
            report.skipped
        )
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width.saturating_sub(3)).collect::<String>())
    } else {
        text.to_string()
    }
}
