//! CLI command implementations.

pub mod lookup;
pub mod scan;

pub use lookup::LookupCommand;
pub use scan::{ScanCommand, SheetSource};

use crate::config::Config;
use crate::fetch::{DirectFetcher, Fetcher, RenderedFetcher};
use anyhow::{Context, Result};
use tracing::debug;

/// Fetch strategies in escalation order: direct, then rendered when enabled.
pub fn build_strategies(config: &Config) -> Result<Vec<Box<dyn Fetcher>>> {
    let direct = DirectFetcher::new(config).context("Failed to create HTTP client")?;
    let mut strategies: Vec<Box<dyn Fetcher>> = vec![Box::new(direct)];

    if config.render_fallback {
        strategies.push(Box::new(RenderedFetcher::new(config)));
    } else {
        debug!("Rendered fallback disabled");
    }

    Ok(strategies)
}
