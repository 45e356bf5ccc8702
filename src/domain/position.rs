//! Position model: the user-visible unit materialized from a definition,
//! plus the display- and raw-shaped balance records derived from it.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::domain::{normalize_token_address, Decimal, StrategyDefinition, StrategyId};

/// Role a token leg plays in a position. Both legs of an order-book strategy
/// are owner-supplied liquidity; there is no debt leg in this protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaRole {
    Supplied,
    Borrowed,
}

/// Underlying-token descriptor for one leg of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderlyingToken {
    pub address: Address,
    pub meta_role: MetaRole,
    pub network: String,
}

/// Produce the two underlying-token descriptors for a definition, normalizing
/// the native-token alias to the zero address. Pure; no I/O.
pub fn underlying_tokens(definition: &StrategyDefinition, network: &str) -> [UnderlyingToken; 2] {
    definition.strategy.tokens.map(|token| UnderlyingToken {
        address: normalize_token_address(token),
        meta_role: MetaRole::Supplied,
        network: network.to_string(),
    })
}

/// One leg of a materialized position, with resolved token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionToken {
    pub address: Address,
    pub symbol: String,
    pub decimals: u32,
    pub meta_role: MetaRole,
}

/// A materialized position: definition plus resolved token legs and a stable
/// identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub key: String,
    pub network: String,
    pub definition: StrategyDefinition,
    pub tokens: [PositionToken; 2],
}

impl Position {
    pub fn new(network: String, definition: StrategyDefinition, tokens: [PositionToken; 2]) -> Self {
        let key = compute_position_key(&network, &definition.controller, &definition.strategy.id);
        Position {
            key,
            network,
            definition,
            tokens,
        }
    }

    /// Stable identity key for one token leg of this position.
    pub fn leg_key(&self, index: usize) -> String {
        compute_leg_key(&self.key, &self.tokens[index].address)
    }

    /// Display label, e.g. `"ETH / USDC"`.
    pub fn label(&self) -> String {
        format!("{} / {}", self.tokens[0].symbol, self.tokens[1].symbol)
    }
}

/// Deterministic position identity: hash of (network, controller, strategy id).
pub fn compute_position_key(network: &str, controller: &Address, id: &StrategyId) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(network.as_bytes());
    hasher.update(controller.as_slice());
    hasher.update(id.as_u256().to_be_bytes::<32>());
    let hash = hasher.finalize();
    format!("pos:{}", hex::encode(&hash[..16]))
}

/// Deterministic leg identity derived from the position key and leg token.
pub fn compute_leg_key(position_key: &str, token: &Address) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(position_key.as_bytes());
    hasher.update(token.as_slice());
    let hash = hasher.finalize();
    format!("leg:{}", hex::encode(&hash[..16]))
}

/// USD-valued, UI-ready balance for one token leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTokenBalance {
    pub address: Address,
    pub symbol: String,
    pub decimals: u32,
    pub meta_role: MetaRole,
    /// Raw integer balance this display amount was derived from.
    pub balance_raw: String,
    pub amount: Decimal,
    pub balance_usd: Decimal,
}

/// USD-valued, UI-ready balance for a whole position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPositionBalance {
    pub key: String,
    pub label: String,
    pub network: String,
    pub balance_usd: Decimal,
    pub tokens: [DisplayTokenBalance; 2],
}

/// Identity-keyed integer balance for one token leg. No USD attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTokenBalance {
    pub key: String,
    pub balance: String,
}

/// Identity-keyed integer balances for a whole position, used for indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPositionBalance {
    pub key: String,
    pub tokens: [RawTokenBalance; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, Strategy, NATIVE_TOKEN_ALIAS};

    fn definition() -> StrategyDefinition {
        StrategyDefinition {
            controller: Address::repeat_byte(0xCC),
            strategy: Strategy {
                id: StrategyId::from(5u64),
                owner: Address::repeat_byte(0xAA),
                tokens: [NATIVE_TOKEN_ALIAS, Address::repeat_byte(0x02)],
                orders: [Order::new(100, 100, 1, 0), Order::new(0, 0, 0, 0)],
            },
        }
    }

    fn position() -> Position {
        let def = definition();
        let tokens = [
            PositionToken {
                address: Address::ZERO,
                symbol: "ETH".to_string(),
                decimals: 18,
                meta_role: MetaRole::Supplied,
            },
            PositionToken {
                address: Address::repeat_byte(0x02),
                symbol: "USDC".to_string(),
                decimals: 6,
                meta_role: MetaRole::Supplied,
            },
        ];
        Position::new("ethereum".to_string(), def, tokens)
    }

    #[test]
    fn test_underlying_tokens_normalize_alias_and_are_supplied() {
        let legs = underlying_tokens(&definition(), "ethereum");
        assert_eq!(legs[0].address, Address::ZERO);
        assert_eq!(legs[1].address, Address::repeat_byte(0x02));
        assert!(legs.iter().all(|leg| leg.meta_role == MetaRole::Supplied));
        assert!(legs.iter().all(|leg| leg.network == "ethereum"));
    }

    #[test]
    fn test_position_key_deterministic() {
        assert_eq!(position().key, position().key);
        assert!(position().key.starts_with("pos:"));
    }

    #[test]
    fn test_position_key_varies_with_identity() {
        let base = compute_position_key(
            "ethereum",
            &Address::repeat_byte(0xCC),
            &StrategyId::from(5u64),
        );
        let other_id = compute_position_key(
            "ethereum",
            &Address::repeat_byte(0xCC),
            &StrategyId::from(6u64),
        );
        let other_network = compute_position_key(
            "base",
            &Address::repeat_byte(0xCC),
            &StrategyId::from(5u64),
        );
        assert_ne!(base, other_id);
        assert_ne!(base, other_network);
    }

    #[test]
    fn test_leg_keys_differ_per_token() {
        let position = position();
        assert_ne!(position.leg_key(0), position.leg_key(1));
        assert!(position.leg_key(0).starts_with("leg:"));
    }

    #[test]
    fn test_label_joins_symbols() {
        assert_eq!(position().label(), "ETH / USDC");
    }
}
