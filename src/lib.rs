pub mod api;
pub mod chain;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod pricing;

pub use chain::{ChainError, MockChain, RpcChainClient, StrategyReader, TokenMetadataReader};
pub use config::{BalanceMode, Config};
pub use db::{init_db, Repository};
pub use domain::{
    Decimal, DisplayPositionBalance, Order, Position, RawPositionBalance, Strategy,
    StrategyDefinition, StrategyId,
};
pub use engine::{discover_definitions, BalanceResolver, BalancesError, DiscoveryError};
pub use error::AppError;
pub use pricing::{HttpPriceSource, StaticPriceSource, TokenRegistry};
