//! HTTP price source against a DefiLlama-style coins API.

use std::collections::HashMap;
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{PriceSource, PricingError};
use crate::domain::Decimal;

/// Price source querying `GET {base}/prices/current/{network}:{address}`.
///
/// Responses look like `{"coins": {"<network>:<address>": {"price": 1.0}}}`;
/// a token missing from `coins` is simply unpriced. Transient failures are
/// retried with exponential backoff; 4xx responses are permanent.
#[derive(Debug, Clone)]
pub struct HttpPriceSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    coins: HashMap<String, CoinPrice>,
}

#[derive(Debug, Deserialize)]
struct CoinPrice {
    price: rust_decimal::Decimal,
}

impl HttpPriceSource {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, url: &str) -> Result<PriceResponse, PricingError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(PricingError::Http(e.to_string())))?;

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                return Err(backoff::Error::transient(PricingError::Http(format!(
                    "status {status}"
                ))));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(PricingError::Http(format!(
                    "status {status}"
                ))));
            }

            response
                .json::<PriceResponse>()
                .await
                .map_err(|e| backoff::Error::permanent(PricingError::Parse(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn price_usd(
        &self,
        network: &str,
        token: Address,
    ) -> Result<Option<Decimal>, PricingError> {
        let coin_key = format!("{}:{:#x}", network, token);
        let url = format!("{}/prices/current/{}", self.base_url, coin_key);
        debug!(%coin_key, "fetching token price");

        let response = self.fetch(&url).await?;
        Ok(response
            .coins
            .get(&coin_key)
            .map(|coin| Decimal::new(coin.price)))
    }
}
