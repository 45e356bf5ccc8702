//! SQLite-backed definition store.
//!
//! This module provides:
//! - Database initialization and migrations
//! - Repository layer for definition and cycle operations

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{DiscoveryCycle, Repository};
