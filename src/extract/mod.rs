//! Turning fetched HTML into prices and product links.

pub mod links;
pub mod price;
pub mod selectors;

pub use links::find_product_link;
pub use price::parse_price;
pub use selectors::extract_price;
