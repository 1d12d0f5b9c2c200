//! Scraped record and its fixed schema

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Placeholder stored for a field that could not be resolved
pub const SENTINEL: &str = "N/A";

/// Format of [`Record::timestamp`]
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical column order of the table
pub const COLUMNS: [&str; 8] = [
    "timestamp",
    "price",
    "market_cap",
    "volume_24h",
    "circulating_supply",
    "price_change_24h",
    "bullish_sentiment",
    "bearish_sentiment",
];

/// Single-valued fields resolved through a locator chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Price,
    MarketCap,
    Volume24h,
    CirculatingSupply,
    PriceChange24h,
}

impl Field {
    /// Column name of the field
    pub fn name(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::MarketCap => "market_cap",
            Self::Volume24h => "volume_24h",
            Self::CirculatingSupply => "circulating_supply",
            Self::PriceChange24h => "price_change_24h",
        }
    }
}

/// One row of the table
///
/// Field declaration order is the column order; the CSV writer relies on it.
/// Values are kept verbatim as displayed on the page (`"$63,201.12"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: String,
    pub price: String,
    pub market_cap: String,
    pub volume_24h: String,
    pub circulating_supply: String,
    pub price_change_24h: String,
    pub bullish_sentiment: String,
    pub bearish_sentiment: String,
}

impl Record {
    /// A record with every data field set to [`SENTINEL`]
    pub fn sentinel(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            price: SENTINEL.to_string(),
            market_cap: SENTINEL.to_string(),
            volume_24h: SENTINEL.to_string(),
            circulating_supply: SENTINEL.to_string(),
            price_change_24h: SENTINEL.to_string(),
            bullish_sentiment: SENTINEL.to_string(),
            bearish_sentiment: SENTINEL.to_string(),
        }
    }

    /// Format a wall-clock instant the way the table stores it
    pub fn format_timestamp(at: DateTime<Local>) -> String {
        at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Price => &mut self.price,
            Field::MarketCap => &mut self.market_cap,
            Field::Volume24h => &mut self.volume_24h,
            Field::CirculatingSupply => &mut self.circulating_supply,
            Field::PriceChange24h => &mut self.price_change_24h,
        };
        *slot = value;
    }

    /// Values in canonical column order
    pub fn values(&self) -> [&str; 8] {
        [
            self.timestamp.as_str(),
            self.price.as_str(),
            self.market_cap.as_str(),
            self.volume_24h.as_str(),
            self.circulating_supply.as_str(),
            self.price_change_24h.as_str(),
            self.bullish_sentiment.as_str(),
            self.bearish_sentiment.as_str(),
        ]
    }

    /// Names of the data columns holding the sentinel
    pub fn sentinel_fields(&self) -> Vec<&'static str> {
        COLUMNS
            .iter()
            .zip(self.values())
            .skip(1)
            .filter(|(_, value)| *value == SENTINEL)
            .map(|(name, _)| *name)
            .collect()
    }
}
