//! Fixed-price source for tests and offline runs.

use std::collections::HashMap;

use alloy_primitives::Address;
use async_trait::async_trait;

use super::{PriceSource, PricingError};
use crate::domain::Decimal;

/// Price source backed by a fixed map. Tokens not in the map are unpriced.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    prices: HashMap<Address, Decimal>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, token: Address, price: &str) -> Self {
        let price = Decimal::from_str_canonical(price).expect("static price must parse");
        self.prices.insert(token, price);
        self
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn price_usd(
        &self,
        _network: &str,
        token: Address,
    ) -> Result<Option<Decimal>, PricingError> {
        Ok(self.prices.get(&token).copied())
    }
}
