//! Fee extraction from the provider's tariff page
//!
//! The page is marketing copy, not an API, so every fee is read by its own
//! rule over the full document text. A rule that does not match only leaves
//! its own fields empty; the other rules are unaffected.

use crate::config::ProviderConfig;
use crate::error::{Result, TariffWatchError};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::provider::http::ensure_success;
use crate::provider::types::{FeeComponents, FeeExtraction};
use once_cell::sync::Lazy;
use regex::Regex;

/// Decimal number with a comma separator, e.g. `4,452` or `43`
const NUMBER: &str = r"(\d+(?:,\d+)?)";
const PER_KWH: &str = r"\s*ct/kWh";
const PER_M3: &str = r"\s*ct/m(?:3|³|&sup3;)";

type Apply = fn(&mut FeeComponents, &[f64]);

struct FeeRule {
    name: &'static str,
    pattern: String,
    apply: Apply,
}

struct CompiledRule {
    name: &'static str,
    regex: Regex,
    apply: Apply,
}

/// `<label> (X ct/kWh incl. BTW voor stroom en Y ct/m3`
fn pair_pattern(label: &str) -> String {
    format!(
        r"{label}\s+\({NUMBER}{PER_KWH}\s+incl\.\s+BTW\s+voor\s+stroom\s+en\s+{NUMBER}{PER_M3}"
    )
}

fn rules() -> Vec<FeeRule> {
    vec![
        FeeRule {
            name: "supplier_markup",
            pattern: pair_pattern("opslag"),
            apply: |f, v| {
                f.supplier_markup_electricity_kwh = Some(v[0]);
                f.supplier_markup_gas_m3 = Some(v[1]);
            },
        },
        FeeRule {
            name: "regional_surcharge",
            pattern: format!(r"regiotoeslag\s+\(enkel\s+bij\s+gas,\s+{NUMBER}{PER_M3}"),
            apply: |f, v| f.regional_surcharge_gas_m3 = Some(v[0]),
        },
        FeeRule {
            name: "energy_tax",
            pattern: pair_pattern("Energiebelasting"),
            apply: |f, v| {
                f.energy_tax_electricity_kwh = Some(v[0]);
                f.energy_tax_gas_m3 = Some(v[1]);
            },
        },
        FeeRule {
            name: "sustainable_energy_surcharge",
            pattern: pair_pattern(r"Opslag\s+Duurzame\s+Energie"),
            apply: |f, v| {
                f.sustainable_energy_surcharge_electricity_kwh = Some(v[0]);
                f.sustainable_energy_surcharge_gas_m3 = Some(v[1]);
            },
        },
        FeeRule {
            // The page has spelled this both "vergoening" and "vergroening"
            name: "greening_fee",
            pattern: format!(
                r"kosten\s+voor\s+de\s+vergr?oening\s+van\s+de\s+stroom\s+\(GvO,\s+{NUMBER}{PER_KWH}"
            ),
            apply: |f, v| f.greening_fee_electricity_kwh = Some(v[0]),
        },
    ]
}

static COMPILED_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    rules()
        .into_iter()
        .filter_map(|rule| {
            Regex::new(&rule.pattern).ok().map(|regex| CompiledRule {
                name: rule.name,
                regex,
                apply: rule.apply,
            })
        })
        .collect()
});

/// Parse a comma-decimal cent amount into euros (`"4,452"` → `0.04452`)
pub fn parse_cents(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|cents| cents / 100.0)
}

impl CompiledRule {
    /// Values of every capture group, or `None` when the rule does not apply
    fn capture(&self, text: &str) -> Option<Vec<f64>> {
        let caps = self.regex.captures(text)?;
        caps.iter()
            .skip(1)
            .map(|m| m.and_then(|m| parse_cents(m.as_str())))
            .collect()
    }
}

/// Run every fee rule over `text`
pub fn extract_fees(text: &str) -> FeeExtraction {
    let mut extraction = FeeExtraction::default();
    for rule in COMPILED_RULES.iter() {
        match rule.capture(text) {
            Some(values) => (rule.apply)(&mut extraction.components, &values),
            None => extraction.missed.push(rule.name),
        }
    }
    extraction
}

/// Scraper for the provider's public tariff page
pub struct FeeScraper {
    http: reqwest::Client,
    url: String,
    logger: StructuredLogger,
}

impl FeeScraper {
    pub fn new(http: reqwest::Client, config: &ProviderConfig) -> Self {
        let logger = get_logger_with_context(LogContext::new("fees").with_source("easyenergy"));
        Self {
            http,
            url: config.fees_url.clone(),
            logger,
        }
    }

    /// Fetch the tariff page and extract whatever fees it still lists
    ///
    /// Succeeds when at least one rule matched; unmatched rules are logged and
    /// reported in [`FeeExtraction::missed`].
    pub async fn fetch_fees(&self) -> Result<FeeExtraction> {
        self.logger.debug(&format!("Requesting fee page: {}", self.url));
        let resp = self.http.get(&self.url).send().await?;
        let resp = ensure_success(resp, "fee page")?;
        let html = resp.text().await?;
        self.logger
            .trace(&format!("Fee page returned {} bytes", html.len()));

        let extraction = extract_fees(&html);
        if extraction.components.is_empty() {
            return Err(TariffWatchError::parse(format!(
                "no fee pattern matched on {}",
                self.url
            )));
        }
        for name in &extraction.missed {
            self.logger
                .warn(&format!("Fee rule '{}' did not match, keeping previous value", name));
        }
        self.logger.debug(&format!(
            "Extracted {} fee values ({} rules missed)",
            extraction.components.found_count(),
            extraction.missed.len()
        ));
        Ok(extraction)
    }
}
