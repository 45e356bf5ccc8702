//! Periodic discovery refresher: runs discovery cycles on an interval and
//! atomically replaces the stored definition set.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::chain::StrategyReader;
use crate::db::Repository;
use crate::engine::{discover_definitions, DiscoveryError};

/// Error type for one refresh cycle.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Runs discovery on a fixed cadence.
///
/// A failed cycle is logged and skipped; the previously stored set stays
/// readable and the next tick retries. Retry/backoff policy lives here, not
/// in the discovery engine.
pub struct DiscoveryRefresher {
    chain: Arc<dyn StrategyReader>,
    repo: Arc<Repository>,
    interval: Duration,
}

impl DiscoveryRefresher {
    pub fn new(chain: Arc<dyn StrategyReader>, repo: Arc<Repository>, interval: Duration) -> Self {
        Self {
            chain,
            repo,
            interval,
        }
    }

    /// Run forever. The first cycle starts immediately.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match self.run_cycle().await {
                Ok(count) => info!(definitions = count, "discovery cycle stored"),
                Err(e) => warn!(error = %e, "discovery cycle failed; keeping previous set"),
            }
        }
    }

    /// Run one discovery cycle and store its output.
    ///
    /// # Errors
    /// Returns an error if discovery or the store replacement fails; the
    /// previously stored set is untouched in either case.
    pub async fn run_cycle(&self) -> Result<usize, RefreshError> {
        let definitions = discover_definitions(self.chain.as_ref()).await?;
        let completed_at_ms = chrono::Utc::now().timestamp_millis();
        self.repo
            .replace_definitions(&definitions, completed_at_ms)
            .await?;
        Ok(definitions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChain;
    use crate::db::init_db;
    use crate::domain::{Order, Strategy, StrategyId};
    use alloy_primitives::Address;
    use tempfile::TempDir;

    async fn test_repo() -> (Arc<Repository>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Arc::new(Repository::new(pool)), temp_dir)
    }

    fn active_strategy(id: u64, tokens: [Address; 2]) -> Strategy {
        Strategy {
            id: StrategyId::from(id),
            owner: Address::repeat_byte(0xAA),
            tokens,
            orders: [Order::new(1, 1, 1, 0), Order::new(0, 0, 0, 0)],
        }
    }

    fn refresher(chain: MockChain, repo: Arc<Repository>) -> DiscoveryRefresher {
        DiscoveryRefresher::new(Arc::new(chain), repo, Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_cycle_stores_discovered_set() {
        let (repo, _temp) = test_repo().await;
        let t0 = Address::repeat_byte(0x01);
        let t1 = Address::repeat_byte(0x02);
        let chain = MockChain::new(Address::repeat_byte(0xCC))
            .with_pair(t0, t1)
            .with_strategy(active_strategy(1, [t0, t1]));

        let stored = refresher(chain, repo.clone()).run_cycle().await.unwrap();

        assert_eq!(stored, 1);
        assert_eq!(repo.list_definitions().await.unwrap().len(), 1);
        assert!(repo.latest_cycle().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_set() {
        let (repo, _temp) = test_repo().await;
        let t0 = Address::repeat_byte(0x01);
        let t1 = Address::repeat_byte(0x02);

        let healthy = MockChain::new(Address::repeat_byte(0xCC))
            .with_pair(t0, t1)
            .with_strategy(active_strategy(1, [t0, t1]));
        refresher(healthy, repo.clone()).run_cycle().await.unwrap();

        let broken = MockChain::new(Address::repeat_byte(0xCC))
            .with_pair(t0, t1)
            .with_failing_pair(t0, t1);
        let result = refresher(broken, repo.clone()).run_cycle().await;

        assert!(matches!(result, Err(RefreshError::Discovery(_))));
        assert_eq!(repo.list_definitions().await.unwrap().len(), 1);
        let cycle = repo.latest_cycle().await.unwrap().unwrap();
        assert_eq!(cycle.definition_count, 1);
    }
}
