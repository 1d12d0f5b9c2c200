//! Bounded retry around a whole scrape attempt
//!
//! One attempt is: open a session, navigate, extract a record, release the
//! session. Any record counts as success, even one made entirely of
//! sentinels; the degradation is logged and left to whoever watches the
//! table. Attempts only fail when the session cannot be created, navigation
//! fails or the session dies during extraction.

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::extract::{ExtractionPlan, extract};
use crate::record::Record;
use crate::session::{PageSession, SessionFactory, SessionGuard};
use crate::store::RecordStore;
use tracing::{error, info, warn};

/// Drives attempts against one page and persists the first record obtained
pub struct Supervisor<F, S> {
    config: ScraperConfig,
    plan: ExtractionPlan,
    factory: F,
    store: S,
}

impl<F, S> Supervisor<F, S>
where
    F: SessionFactory,
    S: RecordStore,
{
    pub fn new(config: ScraperConfig, plan: ExtractionPlan, factory: F, store: S) -> Self {
        Self {
            config,
            plan,
            factory,
            store,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Run with the configured attempt bound
    pub fn run(&self) -> Result<bool> {
        self.run_once(self.config.max_attempts)
    }

    /// Try up to `max_attempts` times and persist the first record
    ///
    /// Returns `Ok(true)` once a record is stored and `Ok(false)` when every
    /// attempt failed. Store errors are not retried and come back as `Err`.
    pub fn run_once(&self, max_attempts: u32) -> Result<bool> {
        for attempt in 1..=max_attempts {
            info!("Scrape attempt {}/{}", attempt, max_attempts);

            match self.attempt() {
                Ok(record) => {
                    report_degradation(&record);
                    self.store.append(&record)?;
                    info!("Scrape successful: {}", record.timestamp);
                    return Ok(true);
                }
                Err(e) => {
                    error!("Error during scraping attempt {}: {}", attempt, e);
                    if attempt < max_attempts {
                        let backoff = self.config.retry_backoff(attempt);
                        if !backoff.is_zero() {
                            info!("Retrying in {:?}", backoff);
                            std::thread::sleep(backoff);
                        }
                    }
                }
            }
        }

        error!("All {} scrape attempts failed", max_attempts);
        Ok(false)
    }

    fn attempt(&self) -> Result<Record> {
        let mut session = SessionGuard::new(self.factory.open()?);
        session.navigate(&self.config.url)?;
        extract(&*session, &self.plan, self.config.timeout)
    }
}

fn report_degradation(record: &Record) {
    let missing = record.sentinel_fields();
    if missing.is_empty() {
        info!("All fields resolved");
    } else {
        warn!(
            "{} of 7 fields unresolved: {}",
            missing.len(),
            missing.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::extract::FieldSpec;
    use crate::locator::Locator;
    use crate::record::{Field, SENTINEL};
    use crate::store::CsvStore;
    use crate::testing::{Attempt, FakeFactory, FakeSession};
    use std::cell::RefCell;
    use std::time::Duration;

    /// Store that keeps rows in memory
    #[derive(Default)]
    struct MemoryStore {
        rows: RefCell<Vec<Record>>,
        fail: bool,
    }

    impl RecordStore for MemoryStore {
        fn append(&self, record: &Record) -> Result<()> {
            if self.fail {
                return Err(std::io::Error::other("read-only filesystem").into());
            }
            self.rows.borrow_mut().push(record.clone());
            Ok(())
        }
    }

    fn config() -> ScraperConfig {
        ScraperConfig::builder()
            .url("https://example.com/currencies/bitcoin/")
            .timeout(Duration::from_millis(10))
            .retry_backoff_base(Duration::ZERO)
            .build()
            .unwrap()
    }

    fn plan() -> ExtractionPlan {
        ExtractionPlan {
            fields: vec![FieldSpec::new(Field::Price, vec![Locator::xpath("//price")])],
            ..Default::default()
        }
    }

    fn priced_page() -> FakeSession {
        FakeSession::new().with_text("//price", "$42,000.00")
    }

    #[test]
    fn test_success_after_two_failures() {
        let factory = FakeFactory::new(vec![
            Attempt::OpenFails,
            Attempt::Page(FakeSession::new().with_navigate_error("net::ERR_TIMED_OUT")),
            Attempt::Page(priced_page()),
        ]);
        let store = MemoryStore::default();
        let supervisor = Supervisor::new(config(), plan(), &factory, &store);

        assert!(supervisor.run_once(3).unwrap());
        assert_eq!(factory.opened(), 3);
        // The first attempt never got a session to release
        assert_eq!(factory.closed(), 2);
        assert_eq!(store.rows.borrow().len(), 1);
        assert_eq!(store.rows.borrow()[0].price, "$42,000.00");
    }

    #[test]
    fn test_every_session_released() {
        let factory = FakeFactory::new(vec![
            Attempt::Page(FakeSession::new().with_navigate_error("net::ERR_TIMED_OUT")),
            Attempt::Page(FakeSession::new().with_fatal("//price")),
            Attempt::Page(priced_page()),
        ]);
        let store = MemoryStore::default();
        let supervisor = Supervisor::new(config(), plan(), &factory, &store);

        assert!(supervisor.run_once(3).unwrap());
        assert_eq!(factory.opened(), 3);
        assert_eq!(factory.closed(), 3);
    }

    #[test]
    fn test_exhaustion_appends_nothing() {
        let factory = FakeFactory::new(vec![
            Attempt::OpenFails,
            Attempt::Page(FakeSession::new().with_navigate_error("net::ERR_NAME_NOT_RESOLVED")),
            Attempt::OpenFails,
        ]);
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("btc.csv"));
        let supervisor = Supervisor::new(config(), plan(), &factory, store.clone());

        assert!(!supervisor.run_once(3).unwrap());
        assert_eq!(factory.opened(), 3);
        assert_eq!(factory.closed(), 1);
        assert!(store.read_all().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_stops_after_first_success() {
        let factory = FakeFactory::new(vec![
            Attempt::Page(priced_page()),
            Attempt::Page(priced_page()),
        ]);
        let store = MemoryStore::default();
        let supervisor = Supervisor::new(config(), plan(), &factory, &store);

        assert!(supervisor.run_once(2).unwrap());
        assert_eq!(factory.opened(), 1);
        assert_eq!(store.rows.borrow().len(), 1);
    }

    #[test]
    fn test_all_sentinel_record_counts_as_success() {
        let factory = FakeFactory::new(vec![Attempt::Page(FakeSession::new())]);
        let store = MemoryStore::default();
        let supervisor = Supervisor::new(config(), plan(), &factory, &store);

        assert!(supervisor.run_once(3).unwrap());
        assert_eq!(factory.opened(), 1);
        let rows = store.rows.borrow();
        assert!(rows[0].values()[1..].iter().all(|v| *v == SENTINEL));
    }

    #[test]
    fn test_store_failure_is_not_retried() {
        let factory = FakeFactory::new(vec![
            Attempt::Page(priced_page()),
            Attempt::Page(priced_page()),
        ]);
        let store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        let supervisor = Supervisor::new(config(), plan(), &factory, &store);

        let err = supervisor.run_once(2).unwrap_err();
        assert!(matches!(err, ScrapeError::Io(_)));
        assert_eq!(factory.opened(), 1);
        assert_eq!(factory.closed(), 1);
    }

    #[test]
    fn test_zero_attempts() {
        let factory = FakeFactory::new(vec![Attempt::Page(priced_page())]);
        let store = MemoryStore::default();
        let supervisor = Supervisor::new(config(), plan(), &factory, &store);

        assert!(!supervisor.run_once(0).unwrap());
        assert_eq!(factory.opened(), 0);
    }

    #[test]
    fn test_end_to_end_creates_table() {
        let session = FakeSession::new()
            .with_text("//price", "$42,000.00")
            .with_text("//volume", "$20B")
            .with_text("//supply", "19.5M BTC")
            .with_text("//change", "+1.2%")
            .with_texts("//ratio", &["75%", "25%"]);
        let factory = FakeFactory::new(vec![Attempt::Page(session)]);

        let mut plan = plan();
        plan.fields.extend([
            FieldSpec::new(Field::MarketCap, vec![Locator::xpath("//cap")]),
            FieldSpec::new(Field::Volume24h, vec![Locator::xpath("//volume")]),
            FieldSpec::new(Field::CirculatingSupply, vec![Locator::xpath("//supply")]),
            FieldSpec::new(Field::PriceChange24h, vec![Locator::xpath("//change")]),
        ]);
        plan.sentiment.page_fallback = vec![Locator::xpath("//ratio")];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bitcoin_hourly_data.csv");
        let supervisor = Supervisor::new(config(), plan, &factory, CsvStore::new(&path));

        assert!(supervisor.run().unwrap());

        let rows = CsvStore::new(&path).read_all().unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.price, "$42,000.00");
        assert_eq!(row.market_cap, SENTINEL);
        assert_eq!(row.volume_24h, "$20B");
        assert_eq!(row.circulating_supply, "19.5M BTC");
        assert_eq!(row.price_change_24h, "+1.2%");
        assert_eq!(row.bullish_sentiment, "75%");
        assert_eq!(row.bearish_sentiment, "25%");

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("timestamp,price,market_cap,volume_24h,"));
    }
}
