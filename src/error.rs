//! Error taxonomy for fetching and extracting prices.

use thiserror::Error;

/// Errors raised while pricing an item.
///
/// Only [`ScrapeError::Configuration`] is fatal. Everything else is downgraded
/// to "no value produced" by the lookup so the next fallback stage runs.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network, timeout or browser navigation failure.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// A document or URL could not be interpreted.
    #[error("could not parse {url}: {reason}")]
    Parse { url: String, reason: String },

    /// Neither the detail page nor the listing produced a price.
    #[error("no price found at {store} using {strategy} fetch")]
    NoMatch { store: String, strategy: String },

    /// Missing credentials, bad sheet target or invalid store profiles.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ScrapeError {
    pub fn transport(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Transport { url: url.into(), reason: reason.to_string() }
    }

    pub fn parse(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Parse { url: url.into(), reason: reason.to_string() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
