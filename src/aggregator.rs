//! Tariff aggregation
//!
//! Combines the fee page and both spot price feeds into one [`Tariff`].
//! A failing source never aborts the cycle: its fields keep the value from the
//! previous snapshot and the source is marked stale. A fee page on which only
//! some rules matched also marks the fees stale.

use crate::error::TariffWatchError;
use crate::logging::{StructuredLogger, get_logger};
use crate::provider::{FeeSource, SpotSource};
use crate::tariff::{Carrier, Tariff, TariffSource};
use chrono::Utc;

/// Outcome of one aggregation cycle
#[derive(Debug)]
pub struct Refresh {
    pub tariff: Tariff,
    /// Sources that failed this cycle, with the reason
    pub failures: Vec<(TariffSource, TariffWatchError)>,
}

impl Refresh {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds tariff snapshots from the configured sources
pub struct TariffAggregator {
    spot: Box<dyn SpotSource>,
    fees: Box<dyn FeeSource>,
    logger: StructuredLogger,
}

impl TariffAggregator {
    pub fn new(spot: Box<dyn SpotSource>, fees: Box<dyn FeeSource>) -> Self {
        Self {
            spot,
            fees,
            logger: get_logger("aggregator"),
        }
    }

    /// Build a new snapshot, starting from the raw values of `previous`
    pub async fn compute(&self, previous: &Tariff) -> Refresh {
        let mut tariff = previous.clone();
        let mut failures = Vec::new();
        let mut partial_fees = false;

        match self.fees.fetch_fees().await {
            Ok(extraction) => {
                tariff.apply_fees(&extraction.components);
                if !extraction.is_complete() {
                    self.logger.warn(&format!(
                        "Fee page incomplete, carrying over: {}",
                        extraction.missed.join(",")
                    ));
                    partial_fees = true;
                }
            }
            Err(e) => {
                self.logger
                    .error(&format!("Fee scrape failed, keeping previous fees: {}", e));
                failures.push((TariffSource::Fees, e));
            }
        }

        for carrier in [Carrier::Gas, Carrier::Electricity] {
            match self.spot.fetch_spot(carrier).await {
                Ok(quote) => tariff.apply_spot(carrier, &quote),
                Err(e) => {
                    self.logger.error(&format!(
                        "{} spot price fetch failed, keeping previous price: {}",
                        carrier, e
                    ));
                    failures.push((TariffSource::spot(carrier), e));
                }
            }
        }

        tariff.apply_vat_rates();
        tariff.updated_at = Some(Utc::now());
        tariff.stale = failures.iter().map(|(source, _)| *source).collect();
        if partial_fees {
            tariff.stale.insert(0, TariffSource::Fees);
        }
        let tariff = tariff.derive();

        self.logger.info(&format!(
            "Tariff computed: electricity total={:.5}/kWh gas total={:.5}/m3 stale=[{}]",
            tariff.total_price(Carrier::Electricity),
            tariff.total_price(Carrier::Gas),
            tariff
                .stale
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(",")
        ));

        Refresh { tariff, failures }
    }
}
