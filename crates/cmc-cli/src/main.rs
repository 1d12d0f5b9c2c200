//! Command-line entry point: one scrape, one row
//!
//! Every option falls back to its `CMC_*` environment variable and then to
//! the built-in default. Exit status is 0 when a row was saved and 1 when
//! every attempt failed; configuration or table errors are reported by
//! `anyhow` with a non-zero status as well.

use anyhow::Context;
use clap::Parser;
use cmc_core::browser::{BrowserOptions, ChromeSessionFactory};
use cmc_core::{CsvStore, ScraperConfig, Supervisor, catalog};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "cmc-scrape")]
#[command(about = "Scrape one market-data snapshot and append it to a CSV table", long_about = None)]
struct Args {
    /// Page to scrape
    #[arg(long)]
    url: Option<String>,

    /// CSV table to append to
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Per-locator wait in seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Attempts before giving up
    #[arg(short = 'n', long, value_name = "N")]
    attempts: Option<u32>,

    /// Run Chrome without a window (true/false)
    #[arg(long, value_name = "BOOL")]
    headless: Option<bool>,

    /// Fixed user agent instead of a random desktop one
    #[arg(long)]
    user_agent: Option<String>,

    /// Pause after page load in seconds
    #[arg(long, value_name = "SECS")]
    settle: Option<u64>,

    /// Base pause between attempts in seconds
    #[arg(long, value_name = "SECS")]
    backoff: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// CLI values first, then `CMC_*` variables, then defaults
    fn config(&self) -> cmc_core::Result<ScraperConfig> {
        let mut builder = ScraperConfig::builder();
        if let Some(url) = &self.url {
            builder = builder.url(url.clone());
        }
        if let Some(path) = &self.output {
            builder = builder.table_path(path.clone());
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(attempts) = self.attempts {
            builder = builder.max_attempts(attempts);
        }
        if let Some(headless) = self.headless {
            builder = builder.headless(headless);
        }
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        if let Some(secs) = self.settle {
            builder = builder.settle_delay(Duration::from_secs(secs));
        }
        if let Some(secs) = self.backoff {
            builder = builder.retry_backoff_base(Duration::from_secs(secs));
        }
        builder.with_env()?.build()
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Initialize tracing
    cmc_utils::init_tracing_with("info", args.log_json);

    let config = args.config().context("invalid configuration")?;
    info!(
        "Starting scraper for {} -> {}",
        config.url,
        config.table_path.display()
    );

    let factory = ChromeSessionFactory::new(BrowserOptions::from(&config));
    let store = CsvStore::new(&config.table_path);
    let supervisor = Supervisor::new(config, catalog::coinmarketcap(), factory, store);

    let saved = supervisor.run().with_context(|| {
        format!(
            "failed to save row to {}",
            supervisor.config().table_path.display()
        )
    })?;

    if saved {
        info!("Finished successfully");
        Ok(ExitCode::SUCCESS)
    } else {
        error!("Finished with errors");
        Ok(ExitCode::FAILURE)
    }
}
