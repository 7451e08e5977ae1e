//! Tariff snapshot and the derivation of VAT and totals
//!
//! A [`Tariff`] holds the raw per-unit components for both carriers plus the
//! derived VAT amounts and totals. Derived values are private and only ever
//! produced by [`Tariff::derive`], so they cannot drift from the raw fields.

use crate::provider::{FeeComponents, SpotQuote};
use chrono::{DateTime, Utc};
use std::fmt;

/// Dutch VAT rate applied to both carriers
pub const VAT_RATE_PERCENT: f64 = 21.0;

/// Energy carrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Carrier {
    Electricity,
    Gas,
}

impl Carrier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Gas => "gas",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream source of a group of tariff fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TariffSource {
    Fees,
    SpotElectricity,
    SpotGas,
}

impl TariffSource {
    pub const fn spot(carrier: Carrier) -> Self {
        match carrier {
            Carrier::Electricity => Self::SpotElectricity,
            Carrier::Gas => Self::SpotGas,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fees => "fees",
            Self::SpotElectricity => "spot_electricity",
            Self::SpotGas => "spot_gas",
        }
    }
}

impl fmt::Display for TariffSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One complete tariff snapshot (prices in EUR per kWh or per m3)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tariff {
    // supplier
    pub spot_price_electricity_kwh: f64,
    pub spot_price_electricity_feed_in_kwh: f64,
    pub supplier_markup_electricity_kwh: f64,
    pub greening_fee_electricity_kwh: f64,

    // government
    pub energy_tax_electricity_kwh: f64,
    pub sustainable_energy_surcharge_electricity_kwh: f64,
    pub vat_rate_electricity_percent: f64,

    // supplier
    pub spot_price_gas_m3: f64,
    pub spot_price_gas_feed_in_m3: f64,
    pub supplier_markup_gas_m3: f64,

    // government
    pub regional_surcharge_gas_m3: f64,
    pub energy_tax_gas_m3: f64,
    pub sustainable_energy_surcharge_gas_m3: f64,
    pub vat_rate_gas_percent: f64,

    pub(crate) vat_amount_electricity_kwh: f64,
    pub(crate) vat_amount_gas_m3: f64,
    pub(crate) total_price_electricity_kwh: f64,
    pub(crate) total_price_gas_m3: f64,

    /// When the refresh cycle that produced this snapshot ran
    pub updated_at: Option<DateTime<Utc>>,

    /// Sources whose values were carried over from an earlier cycle
    pub stale: Vec<TariffSource>,
}

impl Tariff {
    /// Whether the snapshot may be published
    pub fn is_ready(&self) -> bool {
        self.spot_price_electricity_kwh != 0.0
    }

    pub fn is_stale(&self, source: TariffSource) -> bool {
        self.stale.contains(&source)
    }

    /// Sum of every pre-VAT component of a carrier
    pub fn pre_vat_subtotal(&self, carrier: Carrier) -> f64 {
        match carrier {
            Carrier::Electricity => {
                self.spot_price_electricity_kwh
                    + self.supplier_markup_electricity_kwh
                    + self.sustainable_energy_surcharge_electricity_kwh
                    + self.energy_tax_electricity_kwh
                    + self.greening_fee_electricity_kwh
            }
            Carrier::Gas => {
                self.spot_price_gas_m3
                    + self.supplier_markup_gas_m3
                    + self.sustainable_energy_surcharge_gas_m3
                    + self.energy_tax_gas_m3
                    + self.regional_surcharge_gas_m3
            }
        }
    }

    pub fn vat_rate_percent(&self, carrier: Carrier) -> f64 {
        match carrier {
            Carrier::Electricity => self.vat_rate_electricity_percent,
            Carrier::Gas => self.vat_rate_gas_percent,
        }
    }

    pub fn vat_amount(&self, carrier: Carrier) -> f64 {
        match carrier {
            Carrier::Electricity => self.vat_amount_electricity_kwh,
            Carrier::Gas => self.vat_amount_gas_m3,
        }
    }

    pub fn total_price(&self, carrier: Carrier) -> f64 {
        match carrier {
            Carrier::Electricity => self.total_price_electricity_kwh,
            Carrier::Gas => self.total_price_gas_m3,
        }
    }

    /// Recompute VAT amounts and totals from the raw fields
    pub fn derive(mut self) -> Self {
        for carrier in [Carrier::Electricity, Carrier::Gas] {
            let subtotal = self.pre_vat_subtotal(carrier);
            let vat = subtotal * (self.vat_rate_percent(carrier) / 100.0);
            match carrier {
                Carrier::Electricity => {
                    self.vat_amount_electricity_kwh = vat;
                    self.total_price_electricity_kwh = subtotal + vat;
                }
                Carrier::Gas => {
                    self.vat_amount_gas_m3 = vat;
                    self.total_price_gas_m3 = subtotal + vat;
                }
            }
        }
        self
    }

    /// Overwrite the fee fields that were found; missing ones keep their value
    pub fn apply_fees(&mut self, fees: &FeeComponents) {
        let targets = [
            (
                fees.supplier_markup_electricity_kwh,
                &mut self.supplier_markup_electricity_kwh,
            ),
            (fees.supplier_markup_gas_m3, &mut self.supplier_markup_gas_m3),
            (
                fees.regional_surcharge_gas_m3,
                &mut self.regional_surcharge_gas_m3,
            ),
            (
                fees.energy_tax_electricity_kwh,
                &mut self.energy_tax_electricity_kwh,
            ),
            (fees.energy_tax_gas_m3, &mut self.energy_tax_gas_m3),
            (
                fees.sustainable_energy_surcharge_electricity_kwh,
                &mut self.sustainable_energy_surcharge_electricity_kwh,
            ),
            (
                fees.sustainable_energy_surcharge_gas_m3,
                &mut self.sustainable_energy_surcharge_gas_m3,
            ),
            (
                fees.greening_fee_electricity_kwh,
                &mut self.greening_fee_electricity_kwh,
            ),
        ];
        for (value, field) in targets {
            if let Some(v) = value {
                *field = v;
            }
        }
    }

    pub fn apply_spot(&mut self, carrier: Carrier, quote: &SpotQuote) {
        match carrier {
            Carrier::Electricity => {
                self.spot_price_electricity_kwh = quote.usage;
                self.spot_price_electricity_feed_in_kwh = quote.feed_in;
            }
            Carrier::Gas => {
                self.spot_price_gas_m3 = quote.usage;
                self.spot_price_gas_feed_in_m3 = quote.feed_in;
            }
        }
    }

    /// Fixed VAT rates; these are never scraped
    pub fn apply_vat_rates(&mut self) {
        self.vat_rate_electricity_percent = VAT_RATE_PERCENT;
        self.vat_rate_gas_percent = VAT_RATE_PERCENT;
    }

    /// Every raw and derived value keyed by its metric field name
    pub fn metric_fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("spot_price_electricity_kwh", self.spot_price_electricity_kwh),
            (
                "spot_price_electricity_feed_in_kwh",
                self.spot_price_electricity_feed_in_kwh,
            ),
            (
                "supplier_markup_electricity_kwh",
                self.supplier_markup_electricity_kwh,
            ),
            ("greening_fee_electricity_kwh", self.greening_fee_electricity_kwh),
            ("energy_tax_electricity_kwh", self.energy_tax_electricity_kwh),
            (
                "sustainable_energy_surcharge_electricity_kwh",
                self.sustainable_energy_surcharge_electricity_kwh,
            ),
            ("vat_rate_electricity_percent", self.vat_rate_electricity_percent),
            ("spot_price_gas_m3", self.spot_price_gas_m3),
            ("spot_price_gas_feed_in_m3", self.spot_price_gas_feed_in_m3),
            ("supplier_markup_gas_m3", self.supplier_markup_gas_m3),
            ("regional_surcharge_gas_m3", self.regional_surcharge_gas_m3),
            ("energy_tax_gas_m3", self.energy_tax_gas_m3),
            (
                "sustainable_energy_surcharge_gas_m3",
                self.sustainable_energy_surcharge_gas_m3,
            ),
            ("vat_rate_gas_percent", self.vat_rate_gas_percent),
            ("vat_amount_electricity_kwh", self.vat_amount_electricity_kwh),
            ("vat_amount_gas_m3", self.vat_amount_gas_m3),
            ("total_price_electricity_kwh", self.total_price_electricity_kwh),
            ("total_price_gas_m3", self.total_price_gas_m3),
        ]
    }
}
