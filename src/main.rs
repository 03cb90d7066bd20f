//! grocer - grocery price finder CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use grocer::commands::{LookupCommand, ScanCommand, SheetSource};
use grocer::config::{Config, OutputFormat};
use grocer::format::Formatter;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "grocer",
    version,
    about = "Finds the current online price of grocery items",
    long_about = "Reads item names from a spreadsheet, looks each one up across a prioritised list of online grocers and writes back the first price found."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "GROCER_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Never fall back to the headless browser
    #[arg(long, global = true)]
    no_render: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price every item in the sheet and write the results back
    Scan {
        /// Use a local CSV file instead of the configured Google sheet
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Price a single item
    #[command(alias = "l")]
    Lookup {
        /// Item name
        item: String,
    },

    /// List configured stores in priority order
    Stores,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if cli.no_render {
        config.render_fallback = false;
    }

    match cli.command {
        Commands::Scan { csv } => {
            let source = match csv {
                Some(path) => SheetSource::Csv(path),
                None => SheetSource::Google,
            };

            let cmd = ScanCommand::new(config);
            let output = cmd.execute(&source).await?;
            println!("{}", output);
        }

        Commands::Lookup { item } => {
            let cmd = LookupCommand::new(config);
            let output = cmd.execute(&item).await?;
            println!("{}", output);
        }

        Commands::Stores => {
            let formatter = Formatter::new(config.format);
            println!("{}", formatter.format_stores(&config.stores));
        }
    }

    Ok(())
}
