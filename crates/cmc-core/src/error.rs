//! Error types for scraping operations

use thiserror::Error;

/// Result type alias for scraping operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Errors raised while scraping and persisting records
///
/// A locator that simply finds nothing is not an error: the session reports
/// `Ok(None)` and the resolver falls through. Errors are reserved for
/// conditions the caller has to react to.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Browser session could not be created
    #[error("Session error: {0}")]
    Session(String),

    /// Navigation to the target page failed
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The browser went away in the middle of an attempt
    #[error("Session lost: {0}")]
    SessionLost(String),

    /// A single locator could not be evaluated (stale or unreadable element)
    #[error("Locate error: {0}")]
    Locate(String),

    /// Existing table does not carry the canonical header
    #[error("Table schema mismatch: expected {expected:?}, found {found:?}")]
    Schema {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// CSV encoding or decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Whether this error must abort the current attempt
    ///
    /// Only [`ScrapeError::Locate`] is recoverable inside an attempt; it is
    /// treated like a miss by the resolver.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Locate(_))
    }

    /// Whether this error came from the table store
    pub fn is_persist(&self) -> bool {
        matches!(self, Self::Schema { .. } | Self::Csv(_) | Self::Io(_))
    }
}
