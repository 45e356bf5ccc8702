//! Scheduling around the discovery engine.

pub mod refresher;

pub use refresher::{DiscoveryRefresher, RefreshError};
