//! Locator chains for the CoinMarketCap currency page
//!
//! The page's class names are generated and change between deployments, so
//! each chain starts with the most stable hook (a `data-test` attribute or a
//! visible label) and degrades to structural guesses.

use crate::extract::{ExtractionPlan, FieldSpec};
use crate::locator::Locator;
use crate::record::Field;
use crate::sentiment::SentimentSpec;

/// Default target page
pub const DEFAULT_URL: &str = "https://coinmarketcap.com/currencies/bitcoin/";

const SENTIMENT_HEADING: &str = "//div[contains(., 'Community Sentiment')]";

/// Label-driven locator for the stats list (`<dt>` label, `<dd>` value)
fn stat(label: &str) -> Locator {
    Locator::xpath(format!(
        "//dt[.//div[contains(text(),'{label}')]]/following-sibling::dd//span"
    ))
}

/// Plan for a CoinMarketCap currency page
pub fn coinmarketcap() -> ExtractionPlan {
    ExtractionPlan {
        fields: vec![
            FieldSpec::new(
                Field::Price,
                vec![
                    Locator::xpath("//span[@data-test=\"text-cdp-price-display\"]"),
                    Locator::css("div.priceValue > span"),
                    Locator::xpath("//div[contains(@class,'priceValue')]/span"),
                ],
            ),
            FieldSpec::new(
                Field::MarketCap,
                vec![
                    stat("Market cap"),
                    Locator::xpath(
                        "//div[contains(text(),'Market Cap')]/following-sibling::div//span",
                    ),
                    Locator::xpath("//div[.//span[text()[contains(., 'Market Cap')]]]/div//span"),
                ],
            ),
            FieldSpec::new(
                Field::Volume24h,
                vec![
                    stat("Volume (24h"),
                    Locator::xpath(
                        "//div[contains(text(),'Volume') and contains(text(),'24h')]/following-sibling::div//span",
                    ),
                    Locator::xpath("//div[contains(.,'Volume (24h)')]/div//span"),
                ],
            ),
            FieldSpec::new(
                Field::CirculatingSupply,
                vec![
                    stat("Circulating supply"),
                    Locator::xpath(
                        "//div[contains(text(),'Circulating Supply')]/following-sibling::div//span",
                    ),
                ],
            ),
            FieldSpec::new(
                Field::PriceChange24h,
                vec![
                    Locator::xpath("//p[contains(@class, 'change-text')]"),
                    Locator::css("span.sc-15yy2pl-0.kAXKAX"),
                ],
            ),
        ],
        sentiment: SentimentSpec {
            containers: vec![
                Locator::xpath("//div[contains(., 'Community Sentiment') and .//span]"),
                Locator::xpath("//h3[contains(., 'Community Sentiment')]/following-sibling::div"),
                Locator::xpath("//div[contains(@class,'community-sentiment')]"),
            ],
            candidates: vec![
                Locator::xpath(".//span[contains(@class,'ratio')]"),
                Locator::xpath(".//span[contains(@class,'sc-')]/span[contains(., '%')]"),
                Locator::xpath(".//span[contains(., '%')]"),
            ],
            page_fallback: vec![
                Locator::xpath(format!("{SENTIMENT_HEADING}//span[contains(@class,'ratio')]")),
                Locator::xpath(format!("{SENTIMENT_HEADING}//span[contains(., '%')]")),
            ],
        },
    }
}
