//! Bullish/bearish sentiment block
//!
//! Both ratios live in one container that may itself be missing, so this
//! extractor runs two phases: find the container through its own fallback
//! chain, then list candidate values inside it (or page-wide when the
//! container is gone). Values are taken by position. The first candidate is
//! assumed to be the bullish ratio and the second the bearish one, mirroring
//! the page's rendering order; no label check is made, so a reordered block
//! would silently swap them.

use crate::error::Result;
use crate::locator::Locator;
use crate::record::SENTINEL;
use crate::resolver::first_match;
use crate::session::PageSession;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Locators for the sentiment block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSpec {
    /// Fallback chain for the container
    pub containers: Vec<Locator>,
    /// Candidate value locators, relative to the matched container
    pub candidates: Vec<Locator>,
    /// Page-wide candidate locators used when scoping yields nothing
    pub page_fallback: Vec<Locator>,
}

/// Extracted `(bullish, bearish)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentiment {
    pub bullish: String,
    pub bearish: String,
}

impl Sentiment {
    pub fn missing() -> Self {
        Self {
            bullish: SENTINEL.to_string(),
            bearish: SENTINEL.to_string(),
        }
    }

    /// Apply the positional policy to a candidate list
    pub fn from_candidates(candidates: &[String]) -> Self {
        let pick = |i: usize| {
            candidates
                .get(i)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or(SENTINEL)
                .to_string()
        };
        Self {
            bullish: pick(0),
            bearish: pick(1),
        }
    }
}

/// Extract the sentiment pair; never fails
///
/// Any error in either phase, fatal or not, degrades to
/// [`Sentiment::missing`].
pub fn extract_sentiment<S>(session: &S, spec: &SentimentSpec, timeout: Duration) -> Sentiment
where
    S: PageSession + ?Sized,
{
    match candidates(session, spec, timeout) {
        Ok(values) => Sentiment::from_candidates(&values),
        Err(e) => {
            debug!("Sentiment extraction failed: {}", e);
            Sentiment::missing()
        }
    }
}

fn candidates<S>(session: &S, spec: &SentimentSpec, timeout: Duration) -> Result<Vec<String>>
where
    S: PageSession + ?Sized,
{
    if let Some(container) = first_match(session, &spec.containers, timeout)? {
        debug!("Sentiment container found via {}", container.locator);
        let scoped = spec
            .candidates
            .iter()
            .filter_map(|child| container.locator.within(child));
        if let Some(values) = first_non_empty(session, scoped)? {
            return Ok(values);
        }
    } else {
        debug!("Sentiment container not found, querying page-wide");
    }

    Ok(first_non_empty(session, spec.page_fallback.iter().cloned())?.unwrap_or_default())
}

fn first_non_empty<S, I>(session: &S, locators: I) -> Result<Option<Vec<String>>>
where
    S: PageSession + ?Sized,
    I: IntoIterator<Item = Locator>,
{
    for locator in locators {
        let values = session.find_all_texts(&locator)?;
        if !values.is_empty() {
            debug!("{} sentiment candidates via {}", values.len(), locator);
            return Ok(Some(values));
        }
    }
    Ok(None)
}
