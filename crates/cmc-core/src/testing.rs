//! In-memory sessions for tests

use crate::error::{Result, ScrapeError};
use crate::locator::Locator;
use crate::session::{PageSession, SessionFactory};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

/// Page backed by a pattern → texts table
#[derive(Default)]
pub struct FakeSession {
    texts: HashMap<String, Vec<String>>,
    soft_failures: HashSet<String>,
    fatal_failures: HashSet<String>,
    navigate_error: Option<String>,
    waited: RefCell<Vec<String>>,
    closed: Rc<Cell<u32>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single element matching `pattern`
    pub fn with_text(self, pattern: &str, text: &str) -> Self {
        self.with_texts(pattern, &[text])
    }

    /// Several elements matching `pattern`, in document order
    pub fn with_texts(mut self, pattern: &str, texts: &[&str]) -> Self {
        self.texts.insert(
            pattern.to_string(),
            texts.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// `pattern` raises a recoverable locate error
    pub fn with_failure(mut self, pattern: &str) -> Self {
        self.soft_failures.insert(pattern.to_string());
        self
    }

    /// `pattern` reports the session as lost
    pub fn with_fatal(mut self, pattern: &str) -> Self {
        self.fatal_failures.insert(pattern.to_string());
        self
    }

    pub fn with_navigate_error(mut self, reason: &str) -> Self {
        self.navigate_error = Some(reason.to_string());
        self
    }

    /// Patterns handed to `wait_for_text`, in call order
    pub fn waited(&self) -> Vec<String> {
        self.waited.borrow().clone()
    }

    fn check(&self, locator: &Locator) -> Result<()> {
        if self.fatal_failures.contains(locator.pattern()) {
            return Err(ScrapeError::SessionLost(format!("lost at {locator}")));
        }
        if self.soft_failures.contains(locator.pattern()) {
            return Err(ScrapeError::Locate(format!("stale element at {locator}")));
        }
        Ok(())
    }
}

impl PageSession for FakeSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        match &self.navigate_error {
            Some(reason) => Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn wait_for_text(&self, locator: &Locator, _timeout: Duration) -> Result<Option<String>> {
        self.waited.borrow_mut().push(locator.pattern().to_string());
        self.check(locator)?;
        Ok(self
            .texts
            .get(locator.pattern())
            .and_then(|texts| texts.first())
            .map(|text| text.trim().to_string()))
    }

    fn find_all_texts(&self, locator: &Locator) -> Result<Vec<String>> {
        self.check(locator)?;
        Ok(self
            .texts
            .get(locator.pattern())
            .map(|texts| texts.iter().map(|t| t.trim().to_string()).collect())
            .unwrap_or_default())
    }

    fn close(&mut self) -> Result<()> {
        self.closed.set(self.closed.get() + 1);
        Ok(())
    }
}

/// Outcome of one `open` call on [`FakeFactory`]
pub enum Attempt {
    OpenFails,
    Page(FakeSession),
}

/// Hands out scripted sessions and counts opens and closes
#[derive(Default)]
pub struct FakeFactory {
    script: RefCell<VecDeque<Attempt>>,
    opened: Cell<u32>,
    closed: Rc<Cell<u32>>,
}

impl FakeFactory {
    pub fn new(script: Vec<Attempt>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            ..Self::default()
        }
    }

    pub fn opened(&self) -> u32 {
        self.opened.get()
    }

    pub fn closed(&self) -> u32 {
        self.closed.get()
    }
}

impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    fn open(&self) -> Result<FakeSession> {
        self.opened.set(self.opened.get() + 1);
        match self.script.borrow_mut().pop_front() {
            Some(Attempt::Page(mut session)) => {
                session.closed = Rc::clone(&self.closed);
                Ok(session)
            }
            Some(Attempt::OpenFails) | None => {
                Err(ScrapeError::Session("chrome failed to start".to_string()))
            }
        }
    }
}
