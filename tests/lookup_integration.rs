//! End-to-end pricing through the real direct fetcher against a local server,
//! with a canned stand-in for the headless browser.

use async_trait::async_trait;
use grocer::error::{Result, ScrapeError};
use grocer::fetch::{DirectFetcher, Fetcher, Page, Strategy};
use grocer::sheet::{Columns, CsvSheet, MemorySheet};
use grocer::{CatalogScanner, Config, StoreProfile};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_HTML: &str = include_str!("fixtures/search_results.html");
const DETAIL_HTML: &str = include_str!("fixtures/product_detail.html");

const COLS: Columns = Columns { name: 1, store: 2, url: 3, price: 4 };

/// Serves the fixtures by path, the way a browser would after rendering.
#[derive(Default)]
struct CannedBrowser {
    fail: bool,
    fetches: AtomicUsize,
    closes: AtomicUsize,
}

impl CannedBrowser {
    fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }
}

/// Boxable handle so a test can inspect the counters afterwards.
struct BrowserHandle(Arc<CannedBrowser>);

#[async_trait]
impl Fetcher for BrowserHandle {
    async fn fetch(&self, url: &str) -> Result<Page> {
        let this = &self.0;
        this.fetches.fetch_add(1, Ordering::SeqCst);
        if this.fail {
            return Err(ScrapeError::transport(url, "browser unavailable"));
        }

        let resolved = Url::parse(url).map_err(|e| ScrapeError::parse(url, e))?;
        let html = match resolved.path() {
            "/search" => SEARCH_HTML,
            "/product/gochujang-500g" => DETAIL_HTML,
            _ => return Err(ScrapeError::Status { url: url.to_string(), status: 404 }),
        };
        Ok(Page::new(html, resolved))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Rendered
    }

    async fn close(&self) {
        self.0.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn store(name: &str, server: &MockServer) -> StoreProfile {
    StoreProfile::new(
        name,
        format!("{}/search?q={{}}", server.uri()),
        &[".price bdi", ".price"],
        &["meta[itemprop='price']", ".product-price ins"],
    )
}

fn direct() -> Box<dyn Fetcher> {
    let config = Config { timeout_secs: 2, ..Config::default() };
    Box::new(DirectFetcher::new(&config).unwrap())
}

#[tokio::test]
async fn test_blocked_direct_fetch_priced_through_browser() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

    let browser = Arc::new(CannedBrowser::default());
    let scanner = CatalogScanner::new(
        vec![store("A", &server)],
        vec![direct(), Box::new(BrowserHandle(browser.clone()))],
        COLS,
        true,
    );

    let mut sheet = MemorySheet::from_rows(&[&["Item", "Store", "URL", "Price"], &["Gochujang"]]);
    let mut lines = Vec::new();
    let report = scanner.scan(&mut sheet, |o| lines.push(o.to_string())).await.unwrap();

    let detail = format!("{}/product/gochujang-500g", server.uri());
    assert_eq!(sheet.cell(2, 2), "A");
    assert_eq!(sheet.cell(2, 3), detail);
    assert_eq!(sheet.cell(2, 4), "5.99");
    assert_eq!(lines, vec!["Row 2, Gochujang -> A:5.99"]);
    assert_eq!(report.priced(), 1);
    assert_eq!(browser.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_direct_two_hop_follows_redirect_to_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_HTML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product/gochujang-500g"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/p/gochujang"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/gochujang"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL_HTML))
        .mount(&server)
        .await;

    let browser = Arc::new(CannedBrowser::default());
    let scanner = CatalogScanner::new(
        vec![store("A", &server)],
        vec![direct(), Box::new(BrowserHandle(browser.clone()))],
        COLS,
        true,
    );

    let quote = scanner.price_item("Gochujang").await;
    assert_eq!(quote.store_name.as_deref(), Some("A"));
    assert_eq!(quote.price, Some(5.99));
    assert_eq!(quote.source_url.unwrap().as_str(), format!("{}/p/gochujang", server.uri()));
    assert_eq!(browser.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_listing_price_when_detail_page_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_HTML))
        .mount(&server)
        .await;

    let scanner = CatalogScanner::new(vec![store("A", &server)], vec![direct()], COLS, true);

    let quote = scanner.price_item("Gochujang").await;
    assert_eq!(quote.price, Some(6.49));
    assert_eq!(
        quote.source_url.unwrap().as_str(),
        format!("{}/product/gochujang-500g", server.uri())
    );
}

#[tokio::test]
async fn test_every_store_failing_marks_row_unavailable() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(503)).mount(&first).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>No results</body></html>"))
        .mount(&second)
        .await;

    let browser = Arc::new(CannedBrowser::failing());
    let scanner = CatalogScanner::new(
        vec![store("A", &first), store("B", &second)],
        vec![direct(), Box::new(BrowserHandle(browser.clone()))],
        COLS,
        true,
    );

    let mut sheet = MemorySheet::from_rows(&[
        &["Item", "Store", "URL", "Price"],
        &["Gochujang", "Old", "https://old.test/gochujang", "4.00"],
    ]);
    let report = scanner.scan(&mut sheet, |_| {}).await.unwrap();

    assert_eq!(sheet.cell(2, 2), "");
    assert_eq!(sheet.cell(2, 3), "");
    assert_eq!(sheet.cell(2, 4), "N/A");
    assert_eq!(report.unavailable(), 1);
    // Rendered fallback tried once per store
    assert_eq!(browser.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(browser.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_csv_sheet_rewritten_after_scan() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_HTML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product/gochujang-500g"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL_HTML))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("items.csv");
    std::fs::write(&csv_path, "Item,Store,URL,Price\nGochujang,,,\n,,,\n").unwrap();

    let scanner = CatalogScanner::new(vec![store("A", &server)], vec![direct()], COLS, true);
    let mut sheet = CsvSheet::open(&csv_path).unwrap();
    let report = scanner.scan(&mut sheet, |_| {}).await.unwrap();
    assert_eq!(report.skipped, 1);

    let written = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(lines[0], "Item,Store,URL,Price");
    assert_eq!(
        lines[1],
        format!("Gochujang,A,{}/product/gochujang-500g,5.99", server.uri())
    );
}
