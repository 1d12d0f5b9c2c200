//! Browser session abstraction
//!
//! The extraction core only needs a handful of capabilities from a browser:
//! navigate, wait for one element, list elements, read their text and shut
//! down. [`PageSession`] captures exactly that, so the resolver and the
//! supervisor can be driven by headless Chrome in production and by fakes in
//! tests.

use crate::error::Result;
use crate::locator::Locator;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use tracing::{debug, warn};

/// A live page-fetch session
#[cfg_attr(test, mockall::automock)]
pub trait PageSession {
    /// Load `url` and block until navigation completes
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Wait up to `timeout` for the first element matching `locator`
    ///
    /// Returns the element's trimmed text, or `Ok(None)` when nothing matched
    /// before the deadline.
    fn wait_for_text(&self, locator: &Locator, timeout: Duration) -> Result<Option<String>>;

    /// Trimmed texts of every element currently matching `locator`
    ///
    /// An empty vector means no element matched.
    fn find_all_texts(&self, locator: &Locator) -> Result<Vec<String>>;

    /// Terminate the session
    fn close(&mut self) -> Result<()>;
}

/// Creates a fresh session for every attempt
pub trait SessionFactory {
    type Session: PageSession;

    fn open(&self) -> Result<Self::Session>;
}

impl<T: SessionFactory + ?Sized> SessionFactory for &T {
    type Session = T::Session;

    fn open(&self) -> Result<Self::Session> {
        (**self).open()
    }
}

/// Owns a session and closes it when dropped
///
/// Every exit path of an attempt, including `?` returns, goes through
/// `Drop`, so the browser process never outlives the attempt that spawned it.
pub struct SessionGuard<S: PageSession> {
    session: Option<S>,
}

impl<S: PageSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }
}

impl<S: PageSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.session
            .as_ref()
            .expect("session is only taken in drop")
    }
}

impl<S: PageSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        self.session
            .as_mut()
            .expect("session is only taken in drop")
    }
}

impl<S: PageSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            match session.close() {
                Ok(()) => debug!("Session released"),
                Err(e) => warn!("Session close failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;

    #[test]
    fn test_guard_closes_on_drop() {
        let mut session = MockPageSession::new();
        session.expect_close().times(1).returning(|| Ok(()));

        let guard = SessionGuard::new(session);
        drop(guard);
    }

    #[test]
    fn test_guard_closes_on_early_return() {
        fn attempt(session: MockPageSession) -> Result<()> {
            let mut guard = SessionGuard::new(session);
            guard.navigate("https://example.com")?;
            Ok(())
        }

        let mut session = MockPageSession::new();
        session.expect_navigate().times(1).returning(|url| {
            Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
        });
        session.expect_close().times(1).returning(|| Ok(()));

        assert!(attempt(session).is_err());
    }

    #[test]
    fn test_close_error_is_swallowed() {
        let mut session = MockPageSession::new();
        session
            .expect_close()
            .times(1)
            .returning(|| Err(ScrapeError::SessionLost("already gone".to_string())));

        drop(SessionGuard::new(session));
    }
}
