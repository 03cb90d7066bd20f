//! grocer - finds the current online price of grocery items
//!
//! Walks an item sheet, queries a prioritised list of online retailers and
//! writes back the first price found, escalating from plain HTTP to a
//! headless browser for storefronts that render in JavaScript.

pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod format;
pub mod lookup;
pub mod scanner;
pub mod sheet;
pub mod stores;

pub use config::Config;
pub use error::ScrapeError;
pub use lookup::{Quote, StoreLookup};
pub use scanner::{CatalogScanner, ScanReport};
pub use stores::StoreProfile;
