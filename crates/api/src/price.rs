// Upstream BTC price lookup
// Decision: Hide the upstream behind RateProvider so routes can be tested without network
// Decision: Keep the amount as the upstream decimal string; no float rounding

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

/// Spot price of one unit of `base` in `currency`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BtcRate {
    #[schema(example = "BTC")]
    pub base: String,
    #[schema(example = "UAH")]
    pub currency: String,
    #[schema(example = "2512345.67")]
    pub amount: String,
}

/// Source of the current BTC rate
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn btc_rate(&self) -> Result<BtcRate>;
}

/// `{"data": {...}}` envelope used by the Coinbase spot price API
#[derive(Debug, Deserialize)]
struct SpotPriceResponse {
    data: BtcRate,
}

/// Fetches the rate from a Coinbase-compatible spot price endpoint
pub struct HttpRateProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpRateProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn btc_rate(&self) -> Result<BtcRate> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Price request failed")?
            .error_for_status()
            .context("Price service returned an error")?;

        let body: SpotPriceResponse = response
            .json()
            .await
            .context("Failed to decode price response")?;

        Ok(body.data)
    }
}
