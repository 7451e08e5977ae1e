//! easyEnergy tariff provider
//!
//! Two upstream sources feed a tariff snapshot: the hourly spot price API
//! (JSON) and the public tariff page listing the fixed fees (HTML). Both sit
//! behind small async traits so the aggregation logic can run against any
//! implementation.

pub mod fees;
pub mod http;
pub mod spot;
pub mod types;

pub use fees::{FeeScraper, extract_fees};
pub use http::build_http_client;
pub use spot::SpotPriceClient;
pub use types::{FeeComponents, FeeExtraction, SpotQuote, SpotRecord};

use crate::error::Result;
use crate::tariff::Carrier;

/// Source of current-hour spot prices
#[async_trait::async_trait]
pub trait SpotSource: Send + Sync {
    async fn fetch_spot(&self, carrier: Carrier) -> Result<SpotQuote>;
}

/// Source of the fixed per-unit fees
///
/// A partial result lists the rules that missed so their fields can be
/// reported as carried over.
#[async_trait::async_trait]
pub trait FeeSource: Send + Sync {
    async fn fetch_fees(&self) -> Result<FeeExtraction>;
}

#[async_trait::async_trait]
impl SpotSource for SpotPriceClient {
    async fn fetch_spot(&self, carrier: Carrier) -> Result<SpotQuote> {
        SpotPriceClient::fetch_spot(self, carrier).await
    }
}

#[async_trait::async_trait]
impl FeeSource for FeeScraper {
    async fn fetch_fees(&self) -> Result<FeeExtraction> {
        FeeScraper::fetch_fees(self).await
    }
}
