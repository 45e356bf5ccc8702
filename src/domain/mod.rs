//! Domain model: primitives, the on-chain strategy snapshot, and the
//! position/balance shapes derived from it.

pub mod decimal;
pub mod position;
pub mod primitives;
pub mod strategy;

pub use decimal::{Decimal, DecimalRangeError};
pub use position::{
    compute_leg_key, compute_position_key, underlying_tokens, DisplayPositionBalance,
    DisplayTokenBalance, MetaRole, Position, PositionToken, RawPositionBalance, RawTokenBalance,
    UnderlyingToken,
};
pub use primitives::{normalize_token_address, StrategyId, NATIVE_TOKEN_ALIAS};
pub use strategy::{Order, Strategy, StrategyDefinition};
