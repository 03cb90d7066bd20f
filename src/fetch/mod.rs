//! Document retrieval: plain HTTP or a headless browser render.

pub mod direct;
pub mod rendered;

use crate::error::Result;
use async_trait::async_trait;
use scraper::Html;
use url::Url;

pub use direct::DirectFetcher;
pub use rendered::RenderedFetcher;

/// How a page was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Rendered,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Direct => write!(f, "direct"),
            Strategy::Rendered => write!(f, "rendered"),
        }
    }
}

/// A fetched page and the URL it was finally served from.
#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    pub url: Url,
}

impl Page {
    pub fn new(html: impl Into<String>, url: Url) -> Self {
        Self { html: html.into(), url }
    }

    /// Parses the body. `Html` is not `Send`, so keep it out of `.await` points.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// One retrieval strategy - enables mocking for tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves `url`, following redirects.
    async fn fetch(&self, url: &str) -> Result<Page>;

    fn strategy(&self) -> Strategy;

    /// Releases any long-lived resources. Called once at the end of a scan.
    async fn close(&self) {}
}
