//! Headless Chrome implementation of [`PageSession`]

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::locator::{Locator, LocatorKind};
use crate::session::{PageSession, SessionFactory};
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Keep the DevTools connection open across long locator waits
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

/// Launch settings for the browser process
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Fixed user agent; a random one is drawn per session when unset
    pub user_agent: Option<String>,
    pub settle_delay: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            user_agent: None,
            settle_delay: Duration::ZERO,
        }
    }
}

impl From<&ScraperConfig> for BrowserOptions {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            headless: config.headless,
            user_agent: config.user_agent.clone(),
            settle_delay: config.settle_delay,
            ..Self::default()
        }
    }
}

/// Launches one Chrome process per session
#[derive(Debug, Clone, Default)]
pub struct ChromeSessionFactory {
    options: BrowserOptions,
}

impl ChromeSessionFactory {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }
}

impl SessionFactory for ChromeSessionFactory {
    type Session = ChromeSession;

    fn open(&self) -> Result<ChromeSession> {
        let user_agent = self
            .options
            .user_agent
            .clone()
            .unwrap_or_else(cmc_utils::random_user_agent);
        let ua_arg = format!("--user-agent={user_agent}");
        let args = vec![
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&ua_arg),
        ];

        let launch = LaunchOptions::default_builder()
            .headless(self.options.headless)
            .sandbox(false)
            .window_size(Some(self.options.window_size))
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .args(args)
            .build()
            .map_err(|e| ScrapeError::Session(e.to_string()))?;

        let browser = Browser::new(launch).map_err(|e| ScrapeError::Session(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::Session(e.to_string()))?;
        debug!("Chrome session started (headless: {})", self.options.headless);

        Ok(ChromeSession {
            _browser: browser,
            tab,
            settle_delay: self.options.settle_delay,
        })
    }
}

/// One browser process with a single tab
///
/// Dropping the session drops the [`Browser`], which kills the process.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
    settle_delay: Duration,
}

impl ChromeSession {
    fn wait_for(&self, locator: &Locator, timeout: Duration) -> anyhow::Result<Element<'_>> {
        match locator.kind() {
            LocatorKind::XPath => self
                .tab
                .wait_for_xpath_with_custom_timeout(locator.pattern(), timeout),
            LocatorKind::Css => self
                .tab
                .wait_for_element_with_custom_timeout(locator.pattern(), timeout),
        }
    }

    fn find_all(&self, locator: &Locator) -> anyhow::Result<Vec<Element<'_>>> {
        match locator.kind() {
            LocatorKind::XPath => self.tab.find_elements_by_xpath(locator.pattern()),
            LocatorKind::Css => self.tab.find_elements(locator.pattern()),
        }
    }
}

impl PageSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !self.settle_delay.is_zero() {
            debug!("Settling for {:?}", self.settle_delay);
            std::thread::sleep(self.settle_delay);
        }
        Ok(())
    }

    fn wait_for_text(&self, locator: &Locator, timeout: Duration) -> Result<Option<String>> {
        let element = match self.wait_for(locator, timeout) {
            Ok(element) => element,
            Err(e) => {
                debug!("Wait for {} ended: {}", locator, e);
                return Ok(None);
            }
        };

        element
            .get_inner_text()
            .map(|text| Some(text.trim().to_string()))
            .map_err(|e| ScrapeError::Locate(format!("{locator}: {e}")))
    }

    fn find_all_texts(&self, locator: &Locator) -> Result<Vec<String>> {
        // headless_chrome reports "nothing matched" as an error
        let elements = match self.find_all(locator) {
            Ok(elements) => elements,
            Err(e) => {
                debug!("No elements for {}: {}", locator, e);
                return Ok(Vec::new());
            }
        };

        Ok(elements
            .iter()
            .map(|el| {
                el.get_inner_text()
                    .map(|text| text.trim().to_string())
                    .unwrap_or_default()
            })
            .collect())
    }

    fn close(&mut self) -> Result<()> {
        self.tab
            .close(false)
            .map(|_| ())
            .map_err(|e| ScrapeError::SessionLost(e.to_string()))
    }
}
