//! Token registry: ERC-20 metadata cache plus balance normalization.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::RwLock;
use tracing::warn;

use super::{NormalizedBalance, PriceSource, PricingError};
use crate::chain::TokenMetadataReader;
use crate::domain::Decimal;

/// Resolved token descriptor used to materialize position legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u32,
}

/// Resolves token symbol/decimals from chain metadata (cached in-process,
/// metadata is immutable in practice) and combines them with a USD price
/// source to normalize raw balances.
///
/// Expects token addresses already normalized: the native token is the zero
/// address and is special-cased without a chain read.
pub struct TokenRegistry {
    chain: Arc<dyn TokenMetadataReader>,
    prices: Arc<dyn PriceSource>,
    network: String,
    cache: RwLock<HashMap<Address, TokenInfo>>,
}

impl TokenRegistry {
    pub fn new(
        chain: Arc<dyn TokenMetadataReader>,
        prices: Arc<dyn PriceSource>,
        network: String,
    ) -> Self {
        Self {
            chain,
            prices,
            network,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Symbol and decimals for a token, from cache or a one-time chain read.
    pub async fn token_info(&self, token: Address) -> Result<TokenInfo, PricingError> {
        if token == Address::ZERO {
            return Ok(TokenInfo {
                address: token,
                symbol: "ETH".to_string(),
                decimals: 18,
            });
        }

        if let Some(info) = self.cache.read().await.get(&token) {
            return Ok(info.clone());
        }

        let metadata = self.chain.read_token_metadata(token).await?;
        let info = TokenInfo {
            address: token,
            symbol: metadata.symbol,
            decimals: metadata.decimals as u32,
        };
        self.cache.write().await.insert(token, info.clone());
        Ok(info)
    }

    /// Turn a raw integer balance into a display amount and USD value.
    ///
    /// Unpriced tokens value as zero (with a warning) rather than failing:
    /// the holding still exists and must stay visible. Debt legs are negated.
    pub async fn normalize_balance(
        &self,
        token: Address,
        raw: u128,
        is_debt: bool,
    ) -> Result<(TokenInfo, NormalizedBalance), PricingError> {
        let info = self.token_info(token).await?;
        let amount = Decimal::from_raw_units(raw, info.decimals)?;
        let amount = if is_debt { -amount } else { amount };

        let price = match self.prices.price_usd(&self.network, token).await? {
            Some(price) => price,
            None => {
                warn!(token = %token, "no USD price for token; valuing as zero");
                Decimal::zero()
            }
        };

        let balance_usd = amount * price;
        Ok((info, NormalizedBalance {
            amount,
            balance_usd,
        }))
    }
}
