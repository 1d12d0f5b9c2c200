//! Ordered fallback resolution of a single field
//!
//! Page markup drifts. Each field therefore carries a list of locators, most
//! preferred first, and the resolver walks that list until one of them yields
//! non-empty text. Running out of locators is a normal outcome and produces
//! the [`SENTINEL`] value; only fatal session errors leave this module.

use crate::error::Result;
use crate::locator::Locator;
use crate::record::SENTINEL;
use crate::session::PageSession;
use std::time::Duration;
use tracing::debug;

/// The locator that produced a value, together with the value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a> {
    pub locator: &'a Locator,
    pub text: String,
}

/// Evaluate `strategies` in order and return the first non-empty match
///
/// Evaluation is lazy: once a locator matches, later locators are never
/// handed to the session. A locator that times out, matches only blank text
/// or fails with a non-fatal error falls through to the next one.
pub fn first_match<'a, S>(
    session: &S,
    strategies: &'a [Locator],
    timeout: Duration,
) -> Result<Option<Match<'a>>>
where
    S: PageSession + ?Sized,
{
    for locator in strategies {
        match session.wait_for_text(locator, timeout) {
            Ok(Some(text)) => {
                let text = text.trim();
                if !text.is_empty() {
                    return Ok(Some(Match {
                        locator,
                        text: text.to_string(),
                    }));
                }
                debug!("Blank text for {}", locator);
            }
            Ok(None) => debug!("No element for {}", locator),
            Err(e) if !e.is_fatal() => debug!("Locator {} failed: {}", locator, e),
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

/// Resolve a field's text, or [`SENTINEL`] when no strategy matched
pub fn resolve<S>(session: &S, strategies: &[Locator], timeout: Duration) -> Result<String>
where
    S: PageSession + ?Sized,
{
    Ok(first_match(session, strategies, timeout)?
        .map_or_else(|| SENTINEL.to_string(), |m| m.text))
}
