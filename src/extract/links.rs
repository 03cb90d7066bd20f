//! Picks the product-detail link out of a search-results page.
//!
//! Search pages rarely expose a stable "first result", so anchors are scored
//! by whether they mention the query rather than by position alone.

use super::selectors::collapse_whitespace;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::trace;
use url::Url;

/// Every anchor carrying an href.
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Query-string keys storefronts use for the search term, in lookup order.
pub const QUERY_KEYS: &[&str] = &["q", "s", "term", "keywords", "search", "query", "k"];

/// Path fragments that mark an href as a probable product page.
pub const PRODUCT_FRAGMENTS: &[&str] = &["product", "products", "item", "shop"];

/// Finds the most likely product link for `query` on a search-results page.
///
/// The first product-looking anchor that mentions the search term wins; then
/// the first product-looking anchor; then the first anchor on the page.
pub fn find_product_link(document: &Html, base: &Url, query: &str) -> Option<Url> {
    let term = normalize(&search_term(base).unwrap_or_else(|| query.to_string()));

    let mut first_any: Option<Url> = None;
    let mut first_candidate: Option<Url> = None;

    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href.trim()) else {
            trace!("Ignoring unresolvable href '{}'", href);
            continue;
        };

        if first_any.is_none() {
            first_any = Some(resolved.clone());
        }

        if !is_product_href(href) {
            continue;
        }

        if !term.is_empty() {
            let text = collapse_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));
            let title = anchor.value().attr("title").unwrap_or_default();
            let signal = normalize(&format!("{} {} {}", text, title, href));
            if signal.contains(&term) {
                trace!("Matched '{}' on {}", term, resolved);
                return Some(resolved);
            }
        }

        if first_candidate.is_none() {
            first_candidate = Some(resolved);
        }
    }

    first_candidate.or(first_any)
}

/// Recovers the decoded search term from a search URL's query string.
pub fn search_term(url: &Url) -> Option<String> {
    QUERY_KEYS.iter().find_map(|key| {
        url.query_pairs()
            .find(|(k, v)| k == key && !v.trim().is_empty())
            .map(|(_, v)| v.into_owned())
    })
}

/// Lower-cases and strips everything that is not alphanumeric.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
}

fn is_product_href(href: &str) -> bool {
    let href = href.to_lowercase();
    PRODUCT_FRAGMENTS.iter().any(|fragment| href.contains(fragment))
}
