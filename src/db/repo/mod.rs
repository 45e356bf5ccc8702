//! Repository layer for database operations.
//!
//! Methods are organized across submodules by domain:
//! - `definitions.rs` - definition set replacement and queries

mod definitions;

use sqlx::sqlite::SqlitePool;

/// One completed discovery cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryCycle {
    pub id: i64,
    pub completed_at_ms: i64,
    pub definition_count: i64,
}

/// Repository for database operations.
pub struct Repository {
    pub(crate) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}
