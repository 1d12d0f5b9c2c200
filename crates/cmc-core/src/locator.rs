//! Element locator strategies

use serde::{Deserialize, Serialize};
use std::fmt;

/// Query language of a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatorKind {
    /// XPath 1.0 expression
    XPath,
    /// CSS selector
    Css,
}

/// One way of finding an element on the page
///
/// Locators are plain data. They are evaluated by a
/// [`PageSession`](crate::session::PageSession) and never carry state of
/// their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    kind: LocatorKind,
    pattern: String,
}

impl Locator {
    /// Create a locator of the given kind
    pub fn new(kind: LocatorKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
        }
    }

    /// XPath locator
    pub fn xpath(pattern: impl Into<String>) -> Self {
        Self::new(LocatorKind::XPath, pattern)
    }

    /// CSS selector locator
    pub fn css(pattern: impl Into<String>) -> Self {
        Self::new(LocatorKind::Css, pattern)
    }

    pub fn kind(&self) -> LocatorKind {
        self.kind
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Scope a relative `child` locator under the first match of `self`
    ///
    /// XPath children are written relative (`.//span`) and get appended to
    /// the first parent match. CSS has no way to pick the first match of a
    /// whole selector, so CSS children become descendant selectors of every
    /// parent match; use XPath containers when the parent is not unique on
    /// the page. Locators of different kinds cannot be combined and yield
    /// `None`.
    ///
    /// ```
    /// use cmc_core::Locator;
    ///
    /// let parent = Locator::xpath("//div[@id='box']");
    /// let scoped = parent.within(&Locator::xpath(".//span")).unwrap();
    /// assert_eq!(scoped.pattern(), "(//div[@id='box'])[1]//span");
    /// ```
    pub fn within(&self, child: &Locator) -> Option<Locator> {
        match (self.kind, child.kind) {
            (LocatorKind::XPath, LocatorKind::XPath) => {
                let relative = child.pattern.strip_prefix('.').unwrap_or(&child.pattern);
                let relative = if relative.starts_with('/') {
                    relative.to_string()
                } else {
                    format!("/{relative}")
                };
                Some(Locator::xpath(format!("({})[1]{relative}", self.pattern)))
            }
            (LocatorKind::Css, LocatorKind::Css) => {
                Some(Locator::css(format!("{} {}", self.pattern, child.pattern)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LocatorKind::XPath => write!(f, "xpath:{}", self.pattern),
            LocatorKind::Css => write!(f, "css:{}", self.pattern),
        }
    }
}
