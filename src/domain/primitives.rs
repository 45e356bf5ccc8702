//! Domain primitives: strategy identity and well-known addresses.

use alloy_primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};

/// Alias address some protocols use for the native token (ETH) in place of a
/// real ERC-20 contract. Normalized to [`Address::ZERO`] everywhere downstream.
pub const NATIVE_TOKEN_ALIAS: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Contract-assigned strategy identity. Permanent for the strategy's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StrategyId(pub U256);

impl StrategyId {
    pub fn new(id: U256) -> Self {
        StrategyId(id)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<u64> for StrategyId {
    fn from(id: u64) -> Self {
        StrategyId(U256::from(id))
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map the native-token alias to the canonical zero address; other addresses
/// pass through unchanged.
pub fn normalize_token_address(token: Address) -> Address {
    if token == NATIVE_TOKEN_ALIAS {
        Address::ZERO
    } else {
        token
    }
}
