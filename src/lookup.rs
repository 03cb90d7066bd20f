//! Pricing one item at one store.
//!
//! Each strategy runs the same two-hop attempt: search page → product link →
//! detail-page price, then the search page's own listing price. Strategies are
//! tried in order (direct first, rendered second) until one yields a price.

use crate::error::{Result, ScrapeError};
use crate::extract::{extract_price, find_product_link};
use crate::fetch::Fetcher;
use crate::stores::StoreProfile;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

/// Outcome of looking an item up at a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub store_name: Option<String>,
    pub source_url: Option<Url>,
    pub price: Option<f64>,
}

impl Quote {
    pub fn found(store: &StoreProfile, url: Url, price: f64) -> Self {
        Self { store_name: Some(store.name.clone()), source_url: Some(url), price: Some(price) }
    }

    /// A quote with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when a price is present (and positive, when `require_positive`).
    pub fn is_success(&self, require_positive: bool) -> bool {
        self.price.is_some_and(|p| accepts(p, require_positive))
    }
}

fn accepts(price: f64, require_positive: bool) -> bool {
    price.is_finite() && price >= 0.0 && (!require_positive || price > 0.0)
}

/// Runs the fallback state machine for (item, store) pairs.
pub struct StoreLookup<'a> {
    strategies: &'a [Box<dyn Fetcher>],
    require_positive: bool,
}

impl<'a> StoreLookup<'a> {
    /// `strategies` are tried in order; the first to yield a price wins.
    pub fn new(strategies: &'a [Box<dyn Fetcher>], require_positive: bool) -> Self {
        Self { strategies, require_positive }
    }

    /// Looks `item` up at `store`. Failures never escape; they yield an empty quote.
    pub async fn lookup(&self, item: &str, store: &StoreProfile) -> Quote {
        let search_url = store.search_url_for(item);

        for fetcher in self.strategies {
            match self.attempt(fetcher.as_ref(), item, store, &search_url).await {
                Ok(quote) => {
                    info!(
                        "{} @ {}: {:?} via {} fetch",
                        item,
                        store.name,
                        quote.price,
                        fetcher.strategy()
                    );
                    return quote;
                }
                Err(e) => debug!("{} @ {} ({}): {}", item, store.name, fetcher.strategy(), e),
            }
        }

        debug!("{} @ {}: exhausted", item, store.name);
        Quote::empty()
    }

    /// Search page, then detail page, then the listing price.
    async fn attempt(
        &self,
        fetcher: &dyn Fetcher,
        item: &str,
        store: &StoreProfile,
        search_url: &str,
    ) -> Result<Quote> {
        let search = fetcher.fetch(search_url).await?;

        let product_url = {
            let document = search.document();
            find_product_link(&document, &search.url, item)
        };

        if let Some(product_url) = &product_url {
            debug!("Product link for {} at {}: {}", item, store.name, product_url);
            match fetcher.fetch(product_url.as_str()).await {
                Ok(detail) => {
                    let price = extract_price(&detail.document(), &store.detail_selectors);
                    match price {
                        Some(p) if self.accepts(p) => return Ok(Quote::found(store, detail.url, p)),
                        Some(p) => debug!("Rejected detail price {} at {}", p, detail.url),
                        None => debug!("No detail price at {}", detail.url),
                    }
                }
                Err(e) => debug!("Detail page failed: {}", e),
            }
        }

        let price = extract_price(&search.document(), &store.list_selectors);
        match price {
            Some(p) if self.accepts(p) => {
                let url = product_url.unwrap_or(search.url);
                Ok(Quote::found(store, url, p))
            }
            _ => Err(ScrapeError::NoMatch {
                store: store.name.clone(),
                strategy: fetcher.strategy().to_string(),
            }),
        }
    }

    fn accepts(&self, price: f64) -> bool {
        accepts(price, self.require_positive)
    }
}
