//! Plain HTTP retrieval using wreq for TLS fingerprint emulation.

use super::{Fetcher, Page, Strategy};
use crate::config::Config;
use crate::error::{Result, ScrapeError};
use anyhow::Context;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;
use url::Url;
use wreq::redirect::Policy;
use wreq::Client;
use wreq_util::Emulation;

/// Direct fetcher: one GET per call, no cookies kept between requests.
pub struct DirectFetcher {
    client: Client,
    user_agent: Option<String>,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl DirectFetcher {
    /// Creates a fetcher with the configured timeout, proxy and delay.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .redirect(Policy::limited(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs));

        // Configure proxy if specified
        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Adds a random delay between requests when configured.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl Fetcher for DirectFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        self.delay().await;

        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-GB,en;q=0.9");

        if let Some(agent) = &self.user_agent {
            request = request.header("User-Agent", agent.as_str());
        }

        let response = request.send().await.map_err(|e| ScrapeError::transport(url, e))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(ScrapeError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let final_url = response.uri().to_string();
        let resolved = Url::parse(&final_url).map_err(|e| ScrapeError::parse(&final_url, e))?;

        let html = response.text().await.map_err(|e| ScrapeError::transport(url, e))?;

        Ok(Page::new(html, resolved))
    }

    fn strategy(&self) -> Strategy {
        Strategy::Direct
    }
}
