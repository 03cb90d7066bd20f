//! Currency string normalization.

/// Parses a price out of free text such as `"£12,345.67 each"`.
///
/// Everything except ASCII digits, `.` and `,` is dropped, then `,` is removed
/// as a thousands separator. Returns `None` when nothing numeric is left.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse().ok()
}
