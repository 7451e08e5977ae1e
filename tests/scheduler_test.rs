use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tariffwatch::error::{Result, TariffWatchError};
use tariffwatch::provider::{FeeComponents, FeeExtraction, FeeSource, SpotQuote, SpotSource};
use tariffwatch::scheduler::PointTemplate;
use tariffwatch::sink::{MetricPoint, MetricsSink};
use tariffwatch::{Carrier, Scheduler, TariffAggregator, TariffStore};
use tokio::sync::mpsc;

struct CountingSpot {
    calls: Arc<AtomicUsize>,
    electricity: Option<f64>,
}

#[async_trait::async_trait]
impl SpotSource for CountingSpot {
    async fn fetch_spot(&self, carrier: Carrier) -> Result<SpotQuote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let usage = match carrier {
            Carrier::Electricity => self
                .electricity
                .ok_or_else(|| TariffWatchError::no_data("no price for this hour"))?,
            Carrier::Gas => 0.8,
        };
        Ok(SpotQuote {
            usage,
            feed_in: usage,
            starts_at: Utc::now(),
            supplier_id: 0,
        })
    }
}

struct NoFees;

#[async_trait::async_trait]
impl FeeSource for NoFees {
    async fn fetch_fees(&self) -> Result<FeeExtraction> {
        Ok(FeeComponents {
            energy_tax_electricity_kwh: Some(0.04452),
            ..FeeComponents::default()
        }
        .into())
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    points: Arc<Mutex<Vec<MetricPoint>>>,
}

#[async_trait::async_trait]
impl MetricsSink for RecordingSink {
    async fn write(&self, point: &MetricPoint) -> Result<()> {
        self.points.lock().unwrap().push(point.clone());
        Ok(())
    }
}

struct FailingSink {
    attempts: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl MetricsSink for FailingSink {
    async fn write(&self, _point: &MetricPoint) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TariffWatchError::sink("connection refused"))
    }
}

fn store(electricity: Option<f64>, calls: &Arc<AtomicUsize>) -> Arc<TariffStore> {
    Arc::new(TariffStore::new(TariffAggregator::new(
        Box::new(CountingSpot {
            calls: Arc::clone(calls),
            electricity,
        }),
        Box::new(NoFees),
    )))
}

fn template() -> PointTemplate {
    PointTemplate {
        measurement: "easyenergy".to_string(),
        source_tag: "easyenergy".to_string(),
    }
}

fn scheduler(store: Arc<TariffStore>, sink: Box<dyn MetricsSink>) -> Scheduler {
    Scheduler::new(
        store,
        sink,
        Duration::from_secs(3600),
        Duration::from_millis(50),
        template(),
    )
}

#[tokio::test]
async fn publish_is_skipped_until_ready() {
    let calls = Arc::new(AtomicUsize::new(0));
    let store = store(None, &calls);
    let sink = RecordingSink::default();
    let scheduler = scheduler(Arc::clone(&store), Box::new(sink.clone()));

    assert!(store.refresh().await.is_err());
    assert!(!scheduler.publish().await.unwrap());
    assert!(sink.points.lock().unwrap().is_empty());
}

#[tokio::test]
async fn publish_writes_current_snapshot() {
    let calls = Arc::new(AtomicUsize::new(0));
    let store = store(Some(0.15), &calls);
    let sink = RecordingSink::default();
    let scheduler = scheduler(Arc::clone(&store), Box::new(sink.clone()));

    store.refresh().await.unwrap();
    assert!(scheduler.publish().await.unwrap());

    let points = sink.points.lock().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].fields["spot_price_electricity_kwh"], 0.15);
    assert_eq!(points[0].fields["energy_tax_electricity_kwh"], 0.04452);
}

#[tokio::test]
async fn run_refreshes_eagerly_and_publishes_until_shutdown() {
    let calls = Arc::new(AtomicUsize::new(0));
    let store = store(Some(0.15), &calls);
    let sink = RecordingSink::default();
    let scheduler = scheduler(store, Box::new(sink.clone()));

    let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(scheduler.run(shutdown_rx));
    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());

    // one eager refresh: gas then electricity
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let points = sink.points.lock().unwrap();
    assert!(!points.is_empty());
    for point in points.iter() {
        assert_eq!(point.measurement, "easyenergy");
        assert_eq!(point.tags["source"], "easyenergy");
    }
}

#[tokio::test]
async fn sink_failures_do_not_stop_the_loop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let attempts = Arc::new(AtomicUsize::new(0));
    let scheduler = scheduler(
        store(Some(0.15), &calls),
        Box::new(FailingSink {
            attempts: Arc::clone(&attempts),
        }),
    );

    let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel::<()>();
    let handle = tokio::spawn(scheduler.run(shutdown_rx));
    tokio::time::sleep(Duration::from_millis(400)).await;
    drop(shutdown_tx);

    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    assert!(attempts.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn out_of_range_period_is_config_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = RecordingSink::default();
    let scheduler = Scheduler::new(
        store(Some(0.15), &calls),
        Box::new(sink.clone()),
        Duration::MAX,
        Duration::from_millis(50),
        template(),
    );

    let (_shutdown_tx, shutdown_rx) = mpsc::unbounded_channel::<()>();
    let result = tokio::spawn(scheduler.run(shutdown_rx)).await.unwrap();
    assert!(matches!(result, Err(TariffWatchError::Config { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(sink.points.lock().unwrap().is_empty());
}

struct HangingSink;

#[async_trait::async_trait]
impl MetricsSink for HangingSink {
    async fn write(&self, _point: &MetricPoint) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

#[tokio::test]
async fn hanging_sink_does_not_delay_shutdown() {
    let calls = Arc::new(AtomicUsize::new(0));
    let scheduler = scheduler(store(Some(0.15), &calls), Box::new(HangingSink));

    let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(scheduler.run(shutdown_rx));
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
