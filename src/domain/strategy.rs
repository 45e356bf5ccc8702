//! On-chain strategy model: paired buy/sell orders per token pair.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::domain::StrategyId;

/// One side (buy or sell) of a strategy's order-book entry.
///
/// A point-in-time snapshot read from the controller; never mutated locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Current reserve available on this side.
    pub y: u128,
    /// Capacity of this side.
    pub z: u128,
    /// Pricing curve coefficient A.
    pub a: u64,
    /// Pricing curve coefficient B.
    pub b: u64,
}

impl Order {
    pub fn new(y: u128, z: u128, a: u64, b: u64) -> Self {
        Order { y, z, a, b }
    }

    /// An order with no curve set contributes nothing to activity.
    pub fn has_curve(&self) -> bool {
        self.a != 0 || self.b != 0
    }
}

/// An owner's paired order commitment for one token pair.
///
/// `tokens[i]` pairs with `orders[i]`. The owner may change on transfer, so
/// it is only trusted within the discovery cycle (or fresh read) it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: StrategyId,
    pub owner: Address,
    pub tokens: [Address; 2],
    pub orders: [Order; 2],
}

impl Strategy {
    /// A strategy is active iff at least one pricing coefficient across both
    /// orders is nonzero. All-zero coefficients mean a withdrawn position.
    pub fn is_active(&self) -> bool {
        self.orders[0].has_curve() || self.orders[1].has_curve()
    }

    /// Current reserves for both legs, in token order.
    pub fn reserves(&self) -> [u128; 2] {
        [self.orders[0].y, self.orders[1].y]
    }
}

/// The discovered, cacheable description of a strategy.
///
/// The full strategy is retained (orders embedded) so cached balance
/// resolution can serve from the last discovery cycle without a re-read.
/// Each cycle produces a full replacement set; definitions are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDefinition {
    /// Controller contract the strategy was read from.
    pub controller: Address,
    pub strategy: Strategy,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy_with_orders(orders: [Order; 2]) -> Strategy {
        Strategy {
            id: StrategyId::from(1u64),
            owner: Address::repeat_byte(0xAA),
            tokens: [Address::repeat_byte(0x01), Address::repeat_byte(0x02)],
            orders,
        }
    }

    #[test]
    fn test_all_zero_coefficients_is_inactive() {
        let s = strategy_with_orders([Order::new(100, 200, 0, 0), Order::new(50, 80, 0, 0)]);
        assert!(!s.is_active());
    }

    #[test]
    fn test_any_single_nonzero_coefficient_is_active() {
        let coefficient_slots = [(1u64, 0u64, 0u64, 0u64), (0, 1, 0, 0), (0, 0, 1, 0), (0, 0, 0, 1)];
        for (a0, b0, a1, b1) in coefficient_slots {
            let s = strategy_with_orders([Order::new(0, 0, a0, b0), Order::new(0, 0, a1, b1)]);
            assert!(s.is_active(), "expected active for coefficients {:?}", (a0, b0, a1, b1));
        }
    }

    #[test]
    fn test_reserves_preserve_leg_order() {
        let s = strategy_with_orders([Order::new(100, 0, 1, 0), Order::new(7, 0, 0, 0)]);
        assert_eq!(s.reserves(), [100, 7]);
    }

    #[test]
    fn test_nonzero_reserve_alone_is_not_activity() {
        // Reserves without a curve mean a withdrawn position mid-teardown.
        let s = strategy_with_orders([Order::new(100, 100, 0, 0), Order::new(0, 0, 0, 0)]);
        assert!(!s.is_active());
    }

    #[test]
    fn test_definition_serialization_roundtrip() {
        let definition = StrategyDefinition {
            controller: Address::repeat_byte(0xCC),
            strategy: strategy_with_orders([Order::new(1, 2, 3, 4), Order::new(5, 6, 7, 8)]),
        };
        let json = serde_json::to_string(&definition).unwrap();
        let back: StrategyDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(definition, back);
    }
}
