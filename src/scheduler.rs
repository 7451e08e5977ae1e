//! Refresh and publish timers
//!
//! One loop waits on three events: refresh due, publish due, shutdown
//! requested. Refreshes run on their own task so a slow provider never delays
//! a publish; at most one refresh runs at a time and a tick that finds one
//! still in flight is dropped. A publish is bounded by [`PUBLISH_TIMEOUT`] so a
//! hanging metrics backend cannot hold up refresh ticks or shutdown.

use crate::config::Config;
use crate::error::{Result, TariffWatchError};
use crate::logging::{StructuredLogger, get_logger};
use crate::sink::{MetricPoint, MetricsSink};
use crate::store::TariffStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, timeout};

/// Upper bound on one metrics write
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Measurement name and source tag of published points
#[derive(Debug, Clone)]
pub struct PointTemplate {
    pub measurement: String,
    pub source_tag: String,
}

pub struct Scheduler {
    store: Arc<TariffStore>,
    sink: Box<dyn MetricsSink>,
    refresh_every: Duration,
    publish_every: Duration,
    template: PointTemplate,
    logger: StructuredLogger,
}

impl Scheduler {
    pub fn new(
        store: Arc<TariffStore>,
        sink: Box<dyn MetricsSink>,
        refresh_every: Duration,
        publish_every: Duration,
        template: PointTemplate,
    ) -> Self {
        Self {
            store,
            sink,
            refresh_every,
            publish_every,
            template,
            logger: get_logger("scheduler"),
        }
    }

    pub fn from_config(
        store: Arc<TariffStore>,
        sink: Box<dyn MetricsSink>,
        config: &Config,
    ) -> Self {
        Self::new(
            store,
            sink,
            config.schedule.refresh_interval(),
            config.schedule.publish_interval(),
            PointTemplate {
                measurement: config.metrics.measurement.clone(),
                source_tag: config.metrics.source_tag.clone(),
            },
        )
    }

    /// Run until a shutdown message arrives or every sender is dropped
    pub async fn run(self, mut shutdown_rx: mpsc::UnboundedReceiver<()>) -> Result<()> {
        self.logger.info(&format!(
            "Scheduler started: refresh every {:?}, publish every {:?}",
            self.refresh_every, self.publish_every
        ));

        let start = Instant::now();
        let mut refresh_interval = timer(start, self.refresh_every, "refresh")?;
        refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut publish_interval = timer(start, self.publish_every, "publish")?;
        publish_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Eager first refresh so a snapshot exists before the first publish
        let mut refresh_task: Option<JoinHandle<()>> = Some(self.spawn_refresh());

        loop {
            tokio::select! {
                _ = refresh_interval.tick() => {
                    let busy = refresh_task.as_ref().is_some_and(|t| !t.is_finished());
                    if busy {
                        self.logger.warn("Previous refresh still running, skipping this tick");
                    } else {
                        refresh_task = Some(self.spawn_refresh());
                    }
                }
                _ = publish_interval.tick() => {
                    let bound = PUBLISH_TIMEOUT.min(self.publish_every);
                    match timeout(bound, self.publish()).await {
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) if e.is_recoverable() => {
                            self.logger.warn(&format!("Publish failed, retrying next tick: {}", e));
                        }
                        Ok(Err(e)) => self.logger.error(&format!("Publish failed: {}", e)),
                        Err(_) => self.logger.warn("Publish timed out, retrying next tick"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }
        }

        if let Some(task) = refresh_task {
            task.abort();
        }
        self.logger.info("Scheduler stopped");
        Ok(())
    }

    fn spawn_refresh(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let logger = self.logger.clone();
        tokio::spawn(async move {
            match store.refresh().await {
                Ok(tariff) => logger.debug(&format!("Refresh complete: {:?}", tariff)),
                Err(e) => logger.warn(&format!("Refresh produced no publishable tariff: {}", e)),
            }
        })
    }

    /// Write the current snapshot to the sink
    ///
    /// Returns `Ok(false)` without touching the sink while no snapshot is ready.
    pub async fn publish(&self) -> Result<bool> {
        let tariff = self.store.read();
        if !tariff.is_ready() {
            self.logger
                .debug("No electricity spot price yet, skipping publish");
            return Ok(false);
        }

        let point = MetricPoint::from_tariff(
            &tariff,
            &self.template.measurement,
            &self.template.source_tag,
        );
        self.logger
            .debug(&format!("Publishing {} fields", point.fields.len()));
        self.sink.write(&point).await?;
        Ok(true)
    }
}

/// Interval first firing one `period` after `start`
///
/// Rejects periods that are zero or that overflow the clock.
fn timer(start: Instant, period: Duration, name: &str) -> Result<Interval> {
    if period.is_zero() {
        return Err(TariffWatchError::config(format!(
            "{} period must be greater than zero",
            name
        )));
    }
    let first = start.checked_add(period).ok_or_else(|| {
        TariffWatchError::config(format!("{} period of {:?} is out of range", name, period))
    })?;
    Ok(interval_at(first, period))
}
