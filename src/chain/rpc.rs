//! Alloy-backed contract reads over an HTTP JSON-RPC endpoint.

use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_sol_types::sol;
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::{ChainError, StrategyReader, TokenMetadata, TokenMetadataReader};
use crate::domain::{Order, Strategy, StrategyId};

sol! {
    #[sol(rpc)]
    contract CarbonController {
        struct Order {
            uint128 y;
            uint128 z;
            uint64 A;
            uint64 B;
        }

        struct Strategy {
            uint256 id;
            address owner;
            address[2] tokens;
            Order[2] orders;
        }

        function pairs() external view returns (address[2][] memory);
        function strategiesByPair(
            address token0,
            address token1,
            uint256 startIndex,
            uint256 endIndex
        ) external view returns (Strategy[] memory);
        function strategy(uint256 id) external view returns (Strategy memory);
    }
}

sol! {
    #[sol(rpc)]
    contract Erc20 {
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
    }
}

/// Contract read client over a single HTTP RPC endpoint.
///
/// Reads inherit the transport's timeout policy; failed calls surface as
/// [`ChainError`] without retry, leaving retry cadence to the caller's
/// scheduling layer.
#[derive(Debug, Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
    controller: Address,
}

impl RpcChainClient {
    pub fn new(rpc_url: Url, controller: Address) -> Self {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Self {
            provider,
            controller,
        }
    }

    fn contract(&self) -> CarbonController::CarbonControllerInstance<DynProvider> {
        CarbonController::new(self.controller, self.provider.clone())
    }
}

fn map_call_error(err: alloy_contract::Error) -> ChainError {
    match err {
        alloy_contract::Error::TransportError(e) => ChainError::Rpc(e.to_string()),
        other => ChainError::Contract(other.to_string()),
    }
}

fn into_domain_order(order: &CarbonController::Order) -> Order {
    Order {
        y: order.y,
        z: order.z,
        a: order.A,
        b: order.B,
    }
}

fn into_domain_strategy(strategy: CarbonController::Strategy) -> Strategy {
    Strategy {
        id: StrategyId::new(strategy.id),
        owner: strategy.owner,
        tokens: strategy.tokens,
        orders: [
            into_domain_order(&strategy.orders[0]),
            into_domain_order(&strategy.orders[1]),
        ],
    }
}

#[async_trait]
impl StrategyReader for RpcChainClient {
    fn controller(&self) -> Address {
        self.controller
    }

    async fn read_pairs(&self) -> Result<Vec<[Address; 2]>, ChainError> {
        let contract = self.contract();
        let pairs = contract.pairs().call().await.map_err(map_call_error)?;
        debug!(count = pairs.len(), "read pair books");
        Ok(pairs)
    }

    async fn read_strategies_by_pair(
        &self,
        token0: Address,
        token1: Address,
        start_index: U256,
        end_index: U256,
    ) -> Result<Vec<Strategy>, ChainError> {
        let contract = self.contract();
        let strategies = contract
            .strategiesByPair(token0, token1, start_index, end_index)
            .call()
            .await
            .map_err(map_call_error)?;
        debug!(
            token0 = %token0,
            token1 = %token1,
            count = strategies.len(),
            "read strategies for pair"
        );
        Ok(strategies.into_iter().map(into_domain_strategy).collect())
    }

    async fn read_strategy(&self, id: StrategyId) -> Result<Strategy, ChainError> {
        let contract = self.contract();
        let strategy = contract
            .strategy(id.as_u256())
            .call()
            .await
            .map_err(map_call_error)?;
        Ok(into_domain_strategy(strategy))
    }
}

#[async_trait]
impl TokenMetadataReader for RpcChainClient {
    async fn read_token_metadata(&self, token: Address) -> Result<TokenMetadata, ChainError> {
        let erc20 = Erc20::new(token, self.provider.clone());
        let symbol = erc20.symbol().call().await.map_err(map_call_error)?;
        let decimals = erc20.decimals().call().await.map_err(map_call_error)?;
        Ok(TokenMetadata { symbol, decimals })
    }
}
