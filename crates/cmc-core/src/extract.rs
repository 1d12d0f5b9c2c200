//! Record assembly from declared fields

use crate::error::Result;
use crate::locator::Locator;
use crate::record::{Field, Record, SENTINEL};
use crate::resolver::resolve;
use crate::sentiment::{SentimentSpec, extract_sentiment};
use crate::session::PageSession;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// How to find one field, most preferred locator first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: Field,
    pub strategies: Vec<Locator>,
}

impl FieldSpec {
    pub fn new(field: Field, strategies: Vec<Locator>) -> Self {
        Self { field, strategies }
    }
}

/// Everything the orchestrator needs to fill a [`Record`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPlan {
    pub fields: Vec<FieldSpec>,
    pub sentiment: SentimentSpec,
}

/// Resolve every declared field against an already navigated session
///
/// Fields are independent: a field whose locators all miss is stored as
/// [`SENTINEL`] and extraction moves on. The timestamp is taken after the
/// last field resolved. Only fatal session errors are returned.
pub fn extract<S>(session: &S, plan: &ExtractionPlan, timeout: Duration) -> Result<Record>
where
    S: PageSession + ?Sized,
{
    let mut values = Vec::with_capacity(plan.fields.len());
    for spec in &plan.fields {
        let value = resolve(session, &spec.strategies, timeout)?;
        if value == SENTINEL {
            debug!("Field {} unresolved", spec.field.name());
        }
        values.push((spec.field, value));
    }

    let sentiment = extract_sentiment(session, &plan.sentiment, timeout);

    let mut record = Record::sentinel(Record::format_timestamp(Local::now()));
    for (field, value) in values {
        record.set(field, value);
    }
    record.bullish_sentiment = sentiment.bullish;
    record.bearish_sentiment = sentiment.bearish;

    debug!("Extracted record at {}", record.timestamp);
    Ok(record)
}
