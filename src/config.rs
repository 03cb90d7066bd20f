//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::error::ScrapeError;
use crate::sheet::Columns;
use crate::stores::{self, catalog, StoreProfile};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Per-request timeout for direct fetches, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Navigation ceiling for rendered fetches, in seconds
    #[serde(default = "default_render_timeout_secs")]
    pub render_timeout_secs: u64,

    /// Escalate to a headless browser when direct fetching finds no price
    #[serde(default = "default_true")]
    pub render_fallback: bool,

    /// Chrome/Chromium binary; auto-detected when unset
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Overrides the emulated browser's User-Agent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Base delay between direct requests in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Treat a zero price as "not found"
    #[serde(default = "default_true")]
    pub require_positive_price: bool,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Sheet columns (1-based)
    #[serde(default)]
    pub columns: Columns,

    /// Google Sheets target
    #[serde(default)]
    pub sheet: SheetConfig,

    /// Stores in lookup priority order
    #[serde(default = "catalog::default_stores")]
    pub stores: Vec<StoreProfile>,
}

/// Which spreadsheet and worksheet to scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    #[serde(default = "default_worksheet")]
    pub worksheet: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self { spreadsheet_id: None, worksheet: default_worksheet() }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_render_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_worksheet() -> String {
    "Master Sheet".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            render_timeout_secs: default_render_timeout_secs(),
            render_fallback: true,
            chrome_path: None,
            proxy: None,
            user_agent: None,
            delay_ms: 0,
            delay_jitter_ms: 0,
            require_positive_price: true,
            format: OutputFormat::Table,
            columns: Columns::default(),
            sheet: SheetConfig::default(),
            stores: catalog::default_stores(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("grocer.toml");
        if local_config.exists() {
            debug!("Found grocer.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("grocer").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("GROCER_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(path) = std::env::var("GROCER_CHROME_PATH") {
            self.chrome_path = Some(PathBuf::from(path));
        }

        if let Ok(id) = std::env::var("GROCER_SPREADSHEET_ID") {
            self.sheet.spreadsheet_id = Some(id);
        }

        if let Ok(worksheet) = std::env::var("GROCER_WORKSHEET") {
            self.sheet.worksheet = worksheet;
        }

        if let Ok(delay) = std::env::var("GROCER_DELAY") {
            match delay.parse() {
                Ok(d) => self.delay_ms = d,
                Err(_) => warn!("Ignoring GROCER_DELAY={}: not a number", delay),
            }
        }

        if let Ok(timeout) = std::env::var("GROCER_TIMEOUT") {
            match timeout.parse() {
                Ok(t) => self.timeout_secs = t,
                Err(_) => warn!("Ignoring GROCER_TIMEOUT={}: not a number", timeout),
            }
        }

        self
    }

    /// Checks everything a scan relies on before any lookup runs.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.timeout_secs == 0 {
            return Err(ScrapeError::config("timeout_secs must be greater than 0"));
        }
        if self.render_timeout_secs == 0 {
            return Err(ScrapeError::config("render_timeout_secs must be greater than 0"));
        }
        self.columns.validate()?;
        stores::validate_all(&self.stores)
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
