//! Resilient scraping of a single market-data page
//!
//! This crate pulls a fixed set of fields (price, market cap, volume,
//! supply, 24h change, community sentiment) from a page whose markup keeps
//! shifting, and appends one timestamped row per run to a CSV table.
//!
//! # Architecture
//!
//! - [`resolver`]: ordered fallback locators per field, first non-empty
//!   text wins, `"N/A"` when none match
//! - [`extract`]: resolves every field of an [`ExtractionPlan`]
//!   independently into a [`Record`]
//! - [`sentiment`]: two-phase extraction of the bullish/bearish pair
//! - [`supervisor`]: bounded retries around whole attempts, with the
//!   browser session released on every exit path
//! - [`store`]: append-only CSV table with the canonical 8-column header
//!
//! The browser sits behind the [`PageSession`] trait. With the default
//! `chrome` feature, [`browser::ChromeSessionFactory`] drives headless
//! Chrome.
//!
//! # Example
//!
//! ```rust,ignore
//! use cmc_core::browser::{BrowserOptions, ChromeSessionFactory};
//! use cmc_core::{CsvStore, ScraperConfig, Supervisor, catalog};
//!
//! let config = ScraperConfig::builder().with_env()?.build()?;
//! let factory = ChromeSessionFactory::new(BrowserOptions::from(&config));
//! let store = CsvStore::new(&config.table_path);
//! let supervisor = Supervisor::new(config, catalog::coinmarketcap(), factory, store);
//!
//! if !supervisor.run()? {
//!     eprintln!("every attempt failed");
//! }
//! ```

#[cfg(feature = "chrome")]
pub mod browser;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod locator;
pub mod record;
pub mod resolver;
pub mod sentiment;
pub mod session;
pub mod store;
pub mod supervisor;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use config::ScraperConfig;
pub use error::{Result, ScrapeError};
pub use extract::{ExtractionPlan, FieldSpec, extract};
pub use locator::{Locator, LocatorKind};
pub use record::{COLUMNS, Field, Record, SENTINEL};
pub use resolver::{first_match, resolve};
pub use sentiment::{Sentiment, SentimentSpec, extract_sentiment};
pub use session::{PageSession, SessionFactory, SessionGuard};
pub use store::{CsvStore, RecordStore};
pub use supervisor::Supervisor;
