//! Contract read abstraction for the strategy controller and ERC-20 metadata.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Strategy, StrategyId};

pub mod mock;
pub mod rpc;

pub use mock::MockChain;
pub use rpc::RpcChainClient;

/// Error type for contract read operations.
///
/// Transient transport failures and malformed contract responses are kept
/// distinct so callers can tell a flaky endpoint from bad data. This layer
/// owns retry policy; the engine above it never retries.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// RPC transport failure (connection, timeout, endpoint error).
    #[error("rpc error: {0}")]
    Rpc(String),
    /// The call executed but returned data we could not use.
    #[error("contract error: {0}")]
    Contract(String),
}

/// Read operations against the strategy controller contract.
///
/// All methods are point-in-time snapshot reads with no side effects;
/// concurrent calls may observe different chain states.
#[async_trait]
pub trait StrategyReader: Send + Sync {
    /// Address of the controller contract being read.
    fn controller(&self) -> Address;

    /// All token pairs with a strategy book on the controller.
    async fn read_pairs(&self) -> Result<Vec<[Address; 2]>, ChainError>;

    /// Strategies for one pair. A zero/zero index range means the full book.
    async fn read_strategies_by_pair(
        &self,
        token0: Address,
        token1: Address,
        start_index: U256,
        end_index: U256,
    ) -> Result<Vec<Strategy>, ChainError>;

    /// One strategy by id, with current owner and orders.
    async fn read_strategy(&self, id: StrategyId) -> Result<Strategy, ChainError>;
}

/// Symbol and decimals read from an ERC-20 token contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub symbol: String,
    pub decimals: u8,
}

/// ERC-20 metadata reads, kept separate from strategy reads so the pricing
/// layer can depend on just this capability.
#[async_trait]
pub trait TokenMetadataReader: Send + Sync {
    async fn read_token_metadata(&self, token: Address) -> Result<TokenMetadata, ChainError>;
}
