//! Ordered-fallback price extraction with CSS selectors.

use super::price::parse_price;
use scraper::{ElementRef, Html, Selector};
use tracing::{trace, warn};

/// Attribute that machine-readable price tags carry (`<meta itemprop="price" content="5.99">`).
pub const CONTENT_ATTR: &str = "content";

/// Returns the first price produced by `selectors`, tried strictly in order.
///
/// Only the first element matching each selector is considered.
pub fn extract_price<S: AsRef<str>>(document: &Html, selectors: &[S]) -> Option<f64> {
    for raw in selectors {
        let raw = raw.as_ref();
        let selector = match Selector::parse(raw) {
            Ok(selector) => selector,
            Err(e) => {
                warn!("Skipping invalid selector '{}': {}", raw, e);
                continue;
            }
        };

        let Some(element) = document.select(&selector).next() else {
            trace!("No element for selector '{}'", raw);
            continue;
        };

        let text = element_price_text(element);
        if let Some(price) = parse_price(&text) {
            trace!("Selector '{}' yielded {}", raw, price);
            return Some(price);
        }
    }

    None
}

/// Text to feed the price parser: a non-empty `content` attribute, else the
/// element's text with whitespace collapsed.
pub fn element_price_text(element: ElementRef) -> String {
    match element.value().attr(CONTENT_ATTR) {
        Some(content) if !content.trim().is_empty() => content.to_string(),
        _ => collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")),
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><head></head><body>{}</body></html>", body))
    }

    #[test]
    fn test_falls_through_to_later_selector() {
        let html = doc(r#"<span class="b">£3.50</span>"#);
        assert_eq!(extract_price(&html, &[".a", ".b"]), Some(3.50));
    }

    #[test]
    fn test_content_attribute_wins() {
        let html = Html::parse_document(
            r#"<html><head><meta itemprop="price" content="4.20"></head>
               <body><span itemprop="price" content="4.20">Now only £9.99!</span></body></html>"#,
        );
        assert_eq!(extract_price(&html, &["[itemprop='price']"]), Some(4.20));
        assert_eq!(extract_price(&html, &["span[itemprop='price']"]), Some(4.20));
    }

    #[test]
    fn test_empty_content_attribute_uses_text() {
        let html = doc(r#"<span class="price" content="">£7.25</span>"#);
        assert_eq!(extract_price(&html, &[".price"]), Some(7.25));
    }

    #[test]
    fn test_first_price_wins() {
        let html = doc(r#"<span class="sale">£2.00</span><span class="price">£3.00</span>"#);
        assert_eq!(extract_price(&html, &[".price", ".sale"]), Some(3.00));
        assert_eq!(extract_price(&html, &[".sale", ".price"]), Some(2.00));
    }

    #[test]
    fn test_unparseable_element_moves_to_next_selector() {
        let html = doc(r#"<span class="price">Sold out</span><span class="amount">£1.10</span>"#);
        assert_eq!(extract_price(&html, &[".price", ".amount"]), Some(1.10));
    }

    #[test]
    fn test_only_first_matching_element_is_used() {
        // The second .price would parse, but only the first match per selector counts
        let html = doc(r#"<span class="price">Call us</span><span class="price">£8.00</span>"#);
        assert_eq!(extract_price(&html, &[".price"]), None);
    }

    #[test]
    fn test_nested_text_is_collapsed() {
        let html = doc(
            r#"<div class="price">
                 <span class="currency">£</span>
                 <span class="whole">12</span><span class="fraction">.49</span>
               </div>"#,
        );
        assert_eq!(extract_price(&html, &[".price"]), Some(12.49));
    }

    #[test]
    fn test_invalid_selector_is_skipped() {
        let html = doc(r#"<span class="price">£1.00</span>"#);
        assert_eq!(extract_price(&html, &["[[nope", ".price"]), Some(1.00));
    }

    #[test]
    fn test_no_match() {
        let html = doc("<p>nothing here</p>");
        assert_eq!(extract_price(&html, &[".price", ".amount"]), None);
        let empty: [&str; 0] = [];
        assert_eq!(extract_price(&html, &empty), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  £ \n 4.20 \t each "), "£ 4.20 each");
    }
}
