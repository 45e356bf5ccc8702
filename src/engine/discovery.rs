//! Definition discovery: enumerate every strategy book on the controller and
//! reduce it to the active, owner-tagged definition set.

use alloy_primitives::{Address, U256};
use futures::future::try_join_all;
use thiserror::Error;
use tracing::debug;

use crate::chain::{ChainError, StrategyReader};
use crate::domain::{StrategyDefinition, StrategyId};

/// Error type for a discovery cycle. Any failure aborts the whole cycle;
/// partial definition sets are never returned.
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Chain(#[from] ChainError),
    /// A strategy came back under a pair book its tokens do not belong to.
    /// Data-integrity failure; must not be coerced into an empty result.
    #[error("strategy {id} returned for pair ({expected0}, {expected1}) but holds tokens ({got0}, {got1})")]
    PairMismatch {
        id: StrategyId,
        expected0: Address,
        expected1: Address,
        got0: Address,
        got1: Address,
    },
}

/// Enumerate all strategies on the controller and map the active ones to
/// definitions.
///
/// One `pairs()` read, then one unbounded `strategiesByPair` read per pair,
/// all dispatched concurrently and joined. Idempotent and side-effect-free:
/// against unchanged chain state, repeated calls return the same set.
pub async fn discover_definitions(
    reader: &dyn StrategyReader,
) -> Result<Vec<StrategyDefinition>, DiscoveryError> {
    let controller = reader.controller();
    let pairs = reader.read_pairs().await?;
    debug!(pairs = pairs.len(), "enumerating strategy books");

    let reads = pairs
        .iter()
        .map(|pair| reader.read_strategies_by_pair(pair[0], pair[1], U256::ZERO, U256::ZERO));
    let books = try_join_all(reads).await?;

    let mut definitions = Vec::new();
    for (pair, book) in pairs.iter().zip(books) {
        for strategy in book {
            if !tokens_match_pair(&strategy.tokens, pair) {
                return Err(DiscoveryError::PairMismatch {
                    id: strategy.id,
                    expected0: pair[0],
                    expected1: pair[1],
                    got0: strategy.tokens[0],
                    got1: strategy.tokens[1],
                });
            }
            if strategy.is_active() {
                definitions.push(StrategyDefinition {
                    controller,
                    strategy,
                });
            }
        }
    }

    debug!(active = definitions.len(), "discovery complete");
    Ok(definitions)
}

fn tokens_match_pair(tokens: &[Address; 2], pair: &[Address; 2]) -> bool {
    tokens == pair || (tokens[0] == pair[1] && tokens[1] == pair[0])
}
