//! Token pricing and balance normalization.
//!
//! A [`PriceSource`] supplies USD prices; the [`TokenRegistry`] combines
//! prices with on-chain ERC-20 metadata to turn raw integer balances into
//! display amounts and USD values.

use alloy_primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

use crate::chain::ChainError;
use crate::domain::{Decimal, DecimalRangeError};

pub mod http;
pub mod registry;
pub mod statics;

pub use http::HttpPriceSource;
pub use registry::{TokenInfo, TokenRegistry};
pub use statics::StaticPriceSource;

/// Error type for pricing operations.
#[derive(Debug, Clone, Error)]
pub enum PricingError {
    /// Price endpoint failure (network or HTTP status).
    #[error("price source error: {0}")]
    Http(String),
    /// Price endpoint responded with something we could not parse.
    #[error("price parse error: {0}")]
    Parse(String),
    /// Token metadata read failed.
    #[error(transparent)]
    Metadata(#[from] ChainError),
    /// Raw amount not representable at the token's decimals.
    #[error(transparent)]
    Precision(#[from] DecimalRangeError),
}

/// Display amount and USD value derived from one raw balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedBalance {
    pub amount: Decimal,
    pub balance_usd: Decimal,
}

/// USD price lookup for a token on a network.
///
/// Returns `Ok(None)` for tokens the source does not price; callers decide
/// how to value unpriced holdings.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn price_usd(&self, network: &str, token: Address)
        -> Result<Option<Decimal>, PricingError>;
}
