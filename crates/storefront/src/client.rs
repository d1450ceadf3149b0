//! HTTP client for the storefront price-update endpoint.
//!
//! The storefront is the system of record for live prices; a push that
//! fails here must leave the recommendation eligible for retry, so every
//! failure surfaces as `ExternalCallFailed` rather than being absorbed.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use pricepilot_core::error::{PricingError, Result};
use pricepilot_core::traits::PricePusher;

/// Configuration for the storefront client.
#[derive(Debug, Clone)]
pub struct StorefrontClientConfig {
    /// Endpoint URL for price updates.
    pub update_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StorefrontClientConfig {
    fn default() -> Self {
        Self {
            update_url: "http://127.0.0.1:5000/mock-api/update_price".to_string(),
            timeout_secs: 10,
        }
    }
}

impl StorefrontClientConfig {
    #[must_use]
    pub fn with_update_url(mut self, url: impl Into<String>) -> Self {
        self.update_url = url.into();
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Serialize)]
struct PriceUpdateRequest<'a> {
    sku: &'a str,
    new_price: Decimal,
}

pub struct StorefrontClient {
    config: StorefrontClientConfig,
    http: Client,
}

impl StorefrontClient {
    /// Creates a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: StorefrontClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| PricingError::external(format!("client build failed: {err}")))?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl PricePusher for StorefrontClient {
    async fn push_price(&self, sku: &str, new_price: Decimal) -> Result<()> {
        let body = PriceUpdateRequest { sku, new_price };
        let response = self
            .http
            .post(&self.config.update_url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PricingError::external(format!(
                "price update returned {status}: {message}"
            )));
        }

        debug!(sku, %new_price, "price pushed to storefront");
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PricingError {
    if err.is_timeout() {
        PricingError::external(format!("price update timed out: {err}"))
    } else {
        PricingError::external(format!("price update request failed: {err}"))
    }
}
