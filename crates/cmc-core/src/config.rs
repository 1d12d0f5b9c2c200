//! Configuration for a scrape run

use crate::catalog::DEFAULT_URL;
use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default output table
pub const DEFAULT_TABLE_PATH: &str = "bitcoin_hourly_data.csv";

/// Upper bound for the pause between attempts
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(60);

/// Configuration for a scrape run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Page to scrape
    pub url: String,

    /// CSV table that receives one row per successful run
    pub table_path: PathBuf,

    /// Bounded wait applied to every single locator
    pub timeout: Duration,

    /// Number of attempts before giving up
    pub max_attempts: u32,

    /// Pause before the second attempt, doubled for every further one
    pub retry_backoff_base: Duration,

    /// Run the browser without a window
    pub headless: bool,

    /// Fixed user agent; a random desktop agent is used when unset
    pub user_agent: Option<String>,

    /// Pause after navigation before the first lookup
    pub settle_delay: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            timeout: Duration::from_secs(15),
            max_attempts: 2,
            retry_backoff_base: Duration::from_secs(2),
            headless: true,
            user_agent: None,
            settle_delay: Duration::ZERO,
        }
    }
}

impl ScraperConfig {
    /// Create a new configuration builder
    pub fn builder() -> ScraperConfigBuilder {
        ScraperConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.url)
            .map_err(|e| ScrapeError::Config(format!("invalid url '{}': {}", self.url, e)))?;

        if self.max_attempts == 0 {
            return Err(ScrapeError::Config(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(ScrapeError::Config(
                "timeout must be greater than 0".to_string(),
            ));
        }

        if self.table_path.as_os_str().is_empty() {
            return Err(ScrapeError::Config("table_path must not be empty".to_string()));
        }

        Ok(())
    }

    /// Pause to observe after failed attempt number `attempt` (1-based)
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_backoff_base
            .saturating_mul(factor)
            .min(MAX_RETRY_BACKOFF)
    }
}

/// Builder for ScraperConfig
#[derive(Debug, Default)]
pub struct ScraperConfigBuilder {
    url: Option<String>,
    table_path: Option<PathBuf>,
    timeout: Option<Duration>,
    max_attempts: Option<u32>,
    retry_backoff_base: Option<Duration>,
    headless: Option<bool>,
    user_agent: Option<String>,
    settle_delay: Option<Duration>,
}

impl ScraperConfigBuilder {
    /// Set the target page
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the output table
    pub fn table_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.table_path = Some(path.into());
        self
    }

    /// Set the per-locator timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the attempt bound
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set the base pause between attempts
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Toggle headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    /// Pin the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the post-navigation pause
    pub fn settle_delay(mut self, duration: Duration) -> Self {
        self.settle_delay = Some(duration);
        self
    }

    /// Load unset values from `CMC_*` environment variables
    ///
    /// Values already set on the builder win over the environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if self.url.is_none() {
            self.url = var("CMC_URL");
        }
        if self.table_path.is_none() {
            self.table_path = var("CMC_TABLE_PATH").map(PathBuf::from);
        }
        if self.timeout.is_none() {
            self.timeout = parse_var(&var, "CMC_TIMEOUT_SECS")?.map(Duration::from_secs);
        }
        if self.max_attempts.is_none() {
            self.max_attempts = parse_var(&var, "CMC_MAX_ATTEMPTS")?;
        }
        if self.headless.is_none() {
            self.headless = parse_var(&var, "CMC_HEADLESS")?;
        }
        if self.user_agent.is_none() {
            self.user_agent = var("CMC_USER_AGENT").filter(|ua| !ua.trim().is_empty());
        }
        if self.settle_delay.is_none() {
            self.settle_delay = parse_var(&var, "CMC_SETTLE_SECS")?.map(Duration::from_secs);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<ScraperConfig> {
        let defaults = ScraperConfig::default();

        let config = ScraperConfig {
            url: self.url.unwrap_or(defaults.url),
            table_path: self.table_path.unwrap_or(defaults.table_path),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            retry_backoff_base: self
                .retry_backoff_base
                .unwrap_or(defaults.retry_backoff_base),
            headless: self.headless.unwrap_or(defaults.headless),
            user_agent: self.user_agent,
            settle_delay: self.settle_delay.unwrap_or(defaults.settle_delay),
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| ScrapeError::Config(format!("{key}='{raw}': {e}")))
        })
        .transpose()
}
