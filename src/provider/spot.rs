//! Hourly spot price client
//!
//! The request window is anchored to the top of the current UTC hour and the
//! answer is filtered strictly: only a record whose hour contains "now" is
//! accepted. Anything else is a no-data condition.

use crate::config::ProviderConfig;
use crate::error::{Result, TariffWatchError};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::provider::http::ensure_success;
use crate::provider::types::{SpotQuote, SpotRecord};
use crate::tariff::Carrier;
use chrono::{DateTime, Duration, DurationRound, Utc};
use reqwest::Url;

/// Timestamp layout expected by the API (UTC, millisecond precision)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Client for the provider's hourly tariff endpoint
pub struct SpotPriceClient {
    http: reqwest::Client,
    base_url: String,
    electricity_feed: String,
    gas_feed: String,
    logger: StructuredLogger,
}

impl SpotPriceClient {
    pub fn new(http: reqwest::Client, config: &ProviderConfig) -> Self {
        let logger = get_logger_with_context(LogContext::new("spot").with_source("easyenergy"));
        Self {
            http,
            base_url: config.spot_base_url.trim_end_matches('/').to_string(),
            electricity_feed: config.electricity_feed.clone(),
            gas_feed: config.gas_feed.clone(),
            logger,
        }
    }

    /// Provider feed name of a carrier's market
    fn feed(&self, carrier: Carrier) -> &str {
        match carrier {
            Carrier::Electricity => &self.electricity_feed,
            Carrier::Gas => &self.gas_feed,
        }
    }

    /// Request URL covering the hour that contains `now`
    pub fn request_url(&self, carrier: Carrier, now: DateTime<Utc>) -> Result<Url> {
        let (start, end) = hour_window(now);
        let endpoint = format!("{}/get{}tariffs", self.base_url, self.feed(carrier));
        Url::parse_with_params(
            &endpoint,
            &[
                ("startTimestamp", format_timestamp(start)),
                ("endTimestamp", format_timestamp(end)),
                ("grouping", String::new()),
            ],
        )
        .map_err(|e| TariffWatchError::config(format!("Invalid spot price URL {}: {}", endpoint, e)))
    }

    /// Fetch the usage and feed-in price for the current hour
    pub async fn fetch_spot(&self, carrier: Carrier) -> Result<SpotQuote> {
        self.fetch_spot_at(carrier, Utc::now()).await
    }

    /// Fetch the usage and feed-in price for the hour containing `now`
    pub async fn fetch_spot_at(&self, carrier: Carrier, now: DateTime<Utc>) -> Result<SpotQuote> {
        let url = self.request_url(carrier, now)?;
        self.logger
            .debug(&format!("Requesting {} spot prices: {}", carrier, url));

        let resp = self.http.get(url).send().await?;
        let resp = ensure_success(resp, &format!("{} spot price feed", carrier))?;
        let body = resp.bytes().await?;
        let records: Vec<SpotRecord> = serde_json::from_slice(&body)?;

        match select_current(&records, now) {
            Some(record) => {
                let quote = SpotQuote::from(record);
                self.logger.debug(&format!(
                    "{} spot price for {}: usage={:.5} feed_in={:.5}",
                    carrier, quote.starts_at, quote.usage, quote.feed_in
                ));
                Ok(quote)
            }
            None => {
                self.logger.warn(&format!(
                    "No {} spot price covers {} ({} records returned)",
                    carrier,
                    now,
                    records.len()
                ));
                Err(TariffWatchError::no_data(format!(
                    "no {} spot price record covers {}",
                    carrier, now
                )))
            }
        }
    }
}

/// `[start, start + 1h)` of the UTC hour containing `now`
pub fn hour_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
    (start, start + Duration::hours(1))
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Record whose hour `[timestamp, timestamp + 1h)` contains `now`
pub fn select_current(records: &[SpotRecord], now: DateTime<Utc>) -> Option<&SpotRecord> {
    records
        .iter()
        .find(|r| r.timestamp <= now && now < r.timestamp + Duration::hours(1))
}
