use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One hourly record of the spot price API
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpotRecord {
    /// Start of the hour the prices apply to
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub supplier_id: i64,
    pub tariff_usage: f64,
    pub tariff_return: f64,
}

/// Usage and feed-in price for the current hour
#[derive(Debug, Clone, PartialEq)]
pub struct SpotQuote {
    pub usage: f64,
    pub feed_in: f64,
    pub starts_at: DateTime<Utc>,
    pub supplier_id: i64,
}

impl From<&SpotRecord> for SpotQuote {
    fn from(record: &SpotRecord) -> Self {
        Self {
            usage: record.tariff_usage,
            feed_in: record.tariff_return,
            starts_at: record.timestamp,
            supplier_id: record.supplier_id,
        }
    }
}

/// Fee values found on the tariff page, in EUR per unit
///
/// `None` means the corresponding text was not found.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeeComponents {
    pub supplier_markup_electricity_kwh: Option<f64>,
    pub supplier_markup_gas_m3: Option<f64>,
    pub regional_surcharge_gas_m3: Option<f64>,
    pub energy_tax_electricity_kwh: Option<f64>,
    pub energy_tax_gas_m3: Option<f64>,
    pub sustainable_energy_surcharge_electricity_kwh: Option<f64>,
    pub sustainable_energy_surcharge_gas_m3: Option<f64>,
    pub greening_fee_electricity_kwh: Option<f64>,
}

impl FeeComponents {
    fn values(&self) -> [Option<f64>; 8] {
        [
            self.supplier_markup_electricity_kwh,
            self.supplier_markup_gas_m3,
            self.regional_surcharge_gas_m3,
            self.energy_tax_electricity_kwh,
            self.energy_tax_gas_m3,
            self.sustainable_energy_surcharge_electricity_kwh,
            self.sustainable_energy_surcharge_gas_m3,
            self.greening_fee_electricity_kwh,
        ]
    }

    pub fn found_count(&self) -> usize {
        self.values().iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.found_count() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.found_count() == self.values().len()
    }
}

/// Result of running every fee rule over a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeeExtraction {
    pub components: FeeComponents,
    /// Names of the rules that did not match
    pub missed: Vec<&'static str>,
}

impl FeeExtraction {
    /// Every rule matched
    pub fn is_complete(&self) -> bool {
        self.missed.is_empty()
    }
}

impl From<FeeComponents> for FeeExtraction {
    fn from(components: FeeComponents) -> Self {
        Self {
            components,
            missed: Vec::new(),
        }
    }
}
