//! Core pipelines: definition discovery and balance resolution.

pub mod balances;
pub mod discovery;

pub use balances::{BalanceResolver, BalancesError};
pub use discovery::{discover_definitions, DiscoveryError};
