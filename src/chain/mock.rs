//! Mock chain reader for testing without RPC calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use super::{ChainError, StrategyReader, TokenMetadata, TokenMetadataReader};
use crate::domain::{Strategy, StrategyId};

/// Read counters, shared out of the mock so tests can assert that a code
/// path issued (or avoided) contract reads.
#[derive(Debug, Default)]
pub struct ReadCounts {
    pub pairs: AtomicUsize,
    pub strategy_lists: AtomicUsize,
    pub strategies: AtomicUsize,
    pub token_metadata: AtomicUsize,
}

impl ReadCounts {
    pub fn total(&self) -> usize {
        self.pairs.load(Ordering::SeqCst)
            + self.strategy_lists.load(Ordering::SeqCst)
            + self.strategies.load(Ordering::SeqCst)
            + self.token_metadata.load(Ordering::SeqCst)
    }
}

/// Mock chain reader serving predefined pairs, strategies, and token
/// metadata, with per-pair failure injection.
#[derive(Debug, Clone, Default)]
pub struct MockChain {
    controller: Address,
    pairs: Vec<[Address; 2]>,
    strategies: Vec<Strategy>,
    /// Fresh state served by `read_strategy`, when it should differ from the
    /// listed snapshot (transfers, withdrawals).
    overrides: HashMap<StrategyId, Strategy>,
    tokens: HashMap<Address, TokenMetadata>,
    failing_pairs: Vec<[Address; 2]>,
    /// Strategies served under a pair book their tokens do not belong to,
    /// to simulate malformed contract responses.
    mislisted: Vec<([Address; 2], Strategy)>,
    reads: Arc<ReadCounts>,
}

impl MockChain {
    pub fn new(controller: Address) -> Self {
        Self {
            controller,
            ..Default::default()
        }
    }

    pub fn with_pair(mut self, token0: Address, token1: Address) -> Self {
        self.pairs.push([token0, token1]);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Serve a different strategy state from `read_strategy` than the one
    /// listed in the pair book.
    pub fn with_strategy_override(mut self, strategy: Strategy) -> Self {
        self.overrides.insert(strategy.id, strategy);
        self
    }

    pub fn with_token(mut self, address: Address, symbol: &str, decimals: u8) -> Self {
        self.tokens.insert(
            address,
            TokenMetadata {
                symbol: symbol.to_string(),
                decimals,
            },
        );
        self
    }

    /// Make `read_strategies_by_pair` fail for one pair.
    pub fn with_failing_pair(mut self, token0: Address, token1: Address) -> Self {
        self.failing_pairs.push([token0, token1]);
        self
    }

    /// Serve `strategy` under the book for `pair` even though its tokens do
    /// not belong there.
    pub fn with_mislisted_strategy(mut self, pair: [Address; 2], strategy: Strategy) -> Self {
        self.mislisted.push((pair, strategy));
        self
    }

    /// Handle to the shared read counters.
    pub fn reads(&self) -> Arc<ReadCounts> {
        self.reads.clone()
    }

    fn pair_matches(pair: &[Address; 2], tokens: &[Address; 2]) -> bool {
        tokens == pair || (tokens[0] == pair[1] && tokens[1] == pair[0])
    }
}

#[async_trait]
impl StrategyReader for MockChain {
    fn controller(&self) -> Address {
        self.controller
    }

    async fn read_pairs(&self) -> Result<Vec<[Address; 2]>, ChainError> {
        self.reads.pairs.fetch_add(1, Ordering::SeqCst);
        Ok(self.pairs.clone())
    }

    async fn read_strategies_by_pair(
        &self,
        token0: Address,
        token1: Address,
        _start_index: U256,
        _end_index: U256,
    ) -> Result<Vec<Strategy>, ChainError> {
        self.reads.strategy_lists.fetch_add(1, Ordering::SeqCst);
        let pair = [token0, token1];
        if self
            .failing_pairs
            .iter()
            .any(|failing| Self::pair_matches(failing, &pair))
        {
            return Err(ChainError::Rpc("injected pair read failure".to_string()));
        }
        let mut listed: Vec<Strategy> = self
            .strategies
            .iter()
            .filter(|s| Self::pair_matches(&pair, &s.tokens))
            .cloned()
            .collect();
        listed.extend(
            self.mislisted
                .iter()
                .filter(|(listed_pair, _)| Self::pair_matches(listed_pair, &pair))
                .map(|(_, strategy)| strategy.clone()),
        );
        Ok(listed)
    }

    async fn read_strategy(&self, id: StrategyId) -> Result<Strategy, ChainError> {
        self.reads.strategies.fetch_add(1, Ordering::SeqCst);
        if let Some(strategy) = self.overrides.get(&id) {
            return Ok(strategy.clone());
        }
        self.strategies
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ChainError::Contract(format!("unknown strategy id {}", id)))
    }
}

#[async_trait]
impl TokenMetadataReader for MockChain {
    async fn read_token_metadata(&self, token: Address) -> Result<TokenMetadata, ChainError> {
        self.reads.token_metadata.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .get(&token)
            .cloned()
            .ok_or_else(|| ChainError::Contract(format!("no metadata for token {token}")))
    }
}
