//! Metrics backends for published tariff snapshots
//!
//! Points are written to InfluxDB through the `influxdb` client as typed write
//! queries. When no backend is enabled the encoded points are only logged.

use crate::config::MetricsConfig;
use crate::error::{Result, TariffWatchError};
use crate::logging::{StructuredLogger, get_logger};
use crate::tariff::Tariff;
use chrono::{DateTime, Utc};
use influxdb::{Client, Query, Timestamp, WriteQuery};
use reqwest::Url;
use std::collections::BTreeMap;

/// One measurement with its tags and numeric fields
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, f64>,
    pub time: DateTime<Utc>,
}

impl MetricPoint {
    /// Point carrying every tariff value, tagged with its source
    pub fn from_tariff(tariff: &Tariff, measurement: &str, source_tag: &str) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert("source".to_string(), source_tag.to_string());
        let fields = tariff
            .metric_fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        Self {
            measurement: measurement.to_string(),
            tags,
            fields,
            time: Utc::now(),
        }
    }

    /// Typed write query for this point
    ///
    /// Empty tags and non-finite values cannot be stored and are left out.
    pub fn to_write_query(&self) -> WriteQuery {
        let millis = u64::try_from(self.time.timestamp_millis()).unwrap_or_default();
        let mut query = WriteQuery::new(
            Timestamp::Milliseconds(millis as _),
            self.measurement.as_str(),
        );
        for (key, value) in self.tags.iter().filter(|(_, v)| !v.is_empty()) {
            query = query.add_tag(key.as_str(), value.as_str());
        }
        for (key, value) in self.fields.iter().filter(|(_, v)| v.is_finite()) {
            query = query.add_field(key.as_str(), *value);
        }
        query
    }

    /// Line protocol as sent to the backend
    pub fn encode(&self) -> Result<String> {
        self.to_write_query()
            .build()
            .map(|q| q.get())
            .map_err(|e| TariffWatchError::sink(format!("Cannot encode point: {}", e)))
    }
}

/// Destination of published points
#[async_trait::async_trait]
pub trait MetricsSink: Send + Sync {
    async fn write(&self, point: &MetricPoint) -> Result<()>;
}

/// InfluxDB 1.x writer
pub struct InfluxSink {
    client: Client,
    logger: StructuredLogger,
}

impl InfluxSink {
    pub fn new(base_url: &str, database: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/');
        Url::parse(base_url).map_err(|e| {
            TariffWatchError::config(format!("Invalid InfluxDB URL {}: {}", base_url, e))
        })?;
        Ok(Self {
            client: Client::new(base_url, database),
            logger: get_logger("influx"),
        })
    }

    pub fn database(&self) -> &str {
        self.client.database_name()
    }
}

#[async_trait::async_trait]
impl MetricsSink for InfluxSink {
    async fn write(&self, point: &MetricPoint) -> Result<()> {
        let query = point.to_write_query();
        self.logger.trace(&format!(
            "Writing {} fields to {}",
            point.fields.len(),
            self.database()
        ));
        self.client
            .query(query)
            .await
            .map(|_| ())
            .map_err(|e| TariffWatchError::sink(format!("InfluxDB write failed: {}", e)))
    }
}

/// Sink that only logs points
pub struct LogSink {
    logger: StructuredLogger,
}

impl LogSink {
    pub fn new() -> Self {
        Self {
            logger: get_logger("metrics"),
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MetricsSink for LogSink {
    async fn write(&self, point: &MetricPoint) -> Result<()> {
        self.logger.info(&point.encode()?);
        Ok(())
    }
}

/// Sink selected by the metrics configuration
pub fn sink_from_config(config: &MetricsConfig) -> Result<Box<dyn MetricsSink>> {
    if config.enabled {
        Ok(Box::new(InfluxSink::new(&config.url, &config.database)?))
    } else {
        Ok(Box::new(LogSink::new()))
    }
}
