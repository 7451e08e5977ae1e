//! Latest tariff snapshot
//!
//! Two pieces of state with different locking:
//! - the working tariff, guarded by an async mutex that is held across the
//!   whole fetch + compute + replace sequence, so refreshes are serialised;
//! - the published snapshot, an `Arc<Tariff>` in a watch channel that is
//!   swapped in one step, so readers never wait on network I/O and never see
//!   a half-built tariff.

use crate::aggregator::{Refresh, TariffAggregator};
use crate::error::{Result, TariffWatchError};
use crate::logging::{StructuredLogger, get_logger};
use crate::tariff::Tariff;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

pub struct TariffStore {
    aggregator: TariffAggregator,
    /// Last computed tariff, published or not
    working: Mutex<Tariff>,
    snapshot_tx: watch::Sender<Arc<Tariff>>,
    logger: StructuredLogger,
}

impl TariffStore {
    pub fn new(aggregator: TariffAggregator) -> Self {
        let (snapshot_tx, _snapshot_rx) = watch::channel(Arc::new(Tariff::default()));
        Self {
            aggregator,
            working: Mutex::new(Tariff::default()),
            snapshot_tx,
            logger: get_logger("store"),
        }
    }

    /// Run one aggregation cycle and publish the result
    ///
    /// Returns `NotYetAvailable` (and leaves the published snapshot alone)
    /// while the electricity spot price is still unknown.
    pub async fn refresh(&self) -> Result<Arc<Tariff>> {
        let mut working = self.working.lock().await;
        self.logger.debug("Refreshing tariff");

        let Refresh { tariff, failures } = self.aggregator.compute(&working).await;
        *working = tariff;

        if !working.is_ready() {
            self.logger.warn(&format!(
                "No electricity spot price yet ({} source failures), not publishing",
                failures.len()
            ));
            return Err(TariffWatchError::not_yet_available(
                "no spot price for electricity found yet",
            ));
        }

        let snapshot = Arc::new(working.clone());
        self.snapshot_tx.send_replace(Arc::clone(&snapshot));
        self.logger.info(&format!(
            "Tariff snapshot published ({} source failures, {} stale)",
            failures.len(),
            snapshot.stale.len()
        ));
        Ok(snapshot)
    }

    /// Current published snapshot
    pub fn read(&self) -> Arc<Tariff> {
        Arc::clone(&self.snapshot_tx.borrow())
    }

    /// Whether a publishable snapshot exists
    pub fn is_ready(&self) -> bool {
        self.snapshot_tx.borrow().is_ready()
    }

    /// Whether a refresh currently holds the working tariff
    pub fn is_refreshing(&self) -> bool {
        self.working.try_lock().is_err()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<Tariff>> {
        self.snapshot_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FeeComponents, FeeExtraction, FeeSource, SpotQuote, SpotSource};
    use crate::tariff::{Carrier, TariffSource};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Electricity price is unavailable for the first `fail_first` calls
    struct CountingSpot {
        calls: AtomicUsize,
        fail_first: usize,
    }

    #[async_trait::async_trait]
    impl SpotSource for CountingSpot {
        async fn fetch_spot(&self, carrier: Carrier) -> Result<SpotQuote> {
            if carrier == Carrier::Electricity
                && self.calls.fetch_add(1, Ordering::SeqCst) < self.fail_first
            {
                return Err(TariffWatchError::no_data("nothing for this hour"));
            }
            Ok(SpotQuote {
                usage: 0.15,
                feed_in: 0.10,
                starts_at: Utc::now(),
                supplier_id: 0,
            })
        }
    }

    struct TaxOnly;

    #[async_trait::async_trait]
    impl FeeSource for TaxOnly {
        async fn fetch_fees(&self) -> Result<FeeExtraction> {
            Ok(FeeExtraction {
                components: FeeComponents {
                    energy_tax_electricity_kwh: Some(0.03),
                    ..FeeComponents::default()
                },
                missed: vec!["supplier_markup"],
            })
        }
    }

    fn store(fail_first: usize) -> TariffStore {
        TariffStore::new(TariffAggregator::new(
            Box::new(CountingSpot {
                calls: AtomicUsize::new(0),
                fail_first,
            }),
            Box::new(TaxOnly),
        ))
    }

    #[tokio::test]
    async fn not_ready_refresh_leaves_snapshot_untouched() {
        let store = store(1);
        let err = store.refresh().await.unwrap_err();
        assert!(matches!(err, TariffWatchError::NotYetAvailable { .. }));
        assert!(!store.is_ready());
        assert_eq!(*store.read(), Tariff::default());
    }

    #[tokio::test]
    async fn successful_refresh_replaces_snapshot() {
        let store = store(1);
        let mut rx = store.subscribe();
        let _ = store.refresh().await;
        let published = store.refresh().await.unwrap();
        assert!(store.is_ready());
        assert!(Arc::ptr_eq(&published, &store.read()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().energy_tax_electricity_kwh, 0.03);
        assert!(published.is_stale(TariffSource::Fees));
        assert!(!store.is_refreshing());
    }
}
