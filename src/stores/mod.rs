//! Retailer profiles: where to search and which selectors carry the price.

pub mod catalog;

use crate::error::{Result, ScrapeError};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Placeholder in [`StoreProfile::search_url`] replaced by the encoded query.
pub const QUERY_PLACEHOLDER: &str = "{}";

/// Search and price-markup layout of one retailer.
///
/// Selector order encodes preference: the first selector yielding a price wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProfile {
    /// Display name, unique within a configuration
    pub name: String,
    /// Search URL with one `{}` placeholder for the query
    pub search_url: String,
    /// Selectors tried on the search-results page
    pub list_selectors: Vec<String>,
    /// Selectors tried on a resolved product page
    pub detail_selectors: Vec<String>,
}

impl StoreProfile {
    pub fn new(
        name: impl Into<String>,
        search_url: impl Into<String>,
        list_selectors: &[&str],
        detail_selectors: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            search_url: search_url.into(),
            list_selectors: list_selectors.iter().map(|s| s.to_string()).collect(),
            detail_selectors: detail_selectors.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builds the search URL for `query`, form-encoded (spaces become `+`).
    pub fn search_url_for(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.search_url.replacen(QUERY_PLACEHOLDER, &encoded, 1)
    }

    /// Checks the profile invariants.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ScrapeError::config("store name must not be empty"));
        }

        let placeholders = self.search_url.matches(QUERY_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(ScrapeError::config(format!(
                "store '{}': search_url must contain exactly one {} placeholder, found {}",
                self.name, QUERY_PLACEHOLDER, placeholders
            )));
        }

        Url::parse(&self.search_url_for("test")).map_err(|e| {
            ScrapeError::config(format!("store '{}': invalid search_url: {}", self.name, e))
        })?;

        for (kind, selectors) in
            [("list_selectors", &self.list_selectors), ("detail_selectors", &self.detail_selectors)]
        {
            if selectors.is_empty() {
                return Err(ScrapeError::config(format!(
                    "store '{}': {} must not be empty",
                    self.name, kind
                )));
            }
            for selector in selectors {
                Selector::parse(selector).map_err(|e| {
                    ScrapeError::config(format!(
                        "store '{}': invalid selector '{}' in {}: {}",
                        self.name, selector, kind, e
                    ))
                })?;
            }
        }

        Ok(())
    }
}

/// Validates every profile and rejects duplicate names.
pub fn validate_all(stores: &[StoreProfile]) -> Result<()> {
    if stores.is_empty() {
        return Err(ScrapeError::config("at least one store must be configured"));
    }

    let mut seen = HashSet::new();
    for store in stores {
        store.validate()?;
        if !seen.insert(store.name.as_str()) {
            return Err(ScrapeError::config(format!("duplicate store name '{}'", store.name)));
        }
    }

    Ok(())
}
