//! Balance resolution: select an address's positions and compute their
//! current balances in display and raw shapes.

use std::sync::Arc;

use alloy_primitives::Address;
use futures::future::try_join_all;
use thiserror::Error;
use tracing::debug;

use crate::chain::{ChainError, StrategyReader};
use crate::config::BalanceMode;
use crate::db::Repository;
use crate::domain::{
    underlying_tokens, DisplayPositionBalance, DisplayTokenBalance, MetaRole, Position,
    PositionToken, RawPositionBalance, RawTokenBalance, StrategyDefinition, UnderlyingToken,
};
use crate::pricing::{NormalizedBalance, PricingError, TokenInfo, TokenRegistry};

/// Error type for balance resolution.
#[derive(Debug, Error)]
pub enum BalancesError {
    /// No discovery cycle has completed yet, so the definition set is not
    /// usable. Distinct from "this address holds nothing".
    #[error("definition cache not ready: no discovery cycle has completed")]
    NotReady,
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// A position with its order reserves resolved at one observation instant.
/// Both output shapes are mapped from this single snapshot so they cannot
/// diverge.
#[derive(Debug, Clone)]
struct ResolvedPosition {
    position: Position,
    raw: [u128; 2],
    legs: [NormalizedBalance; 2],
}

/// Resolves per-address position balances from the stored definition set.
///
/// Ownership filtering always runs against the last discovery cycle's
/// definitions. In [`BalanceMode::Cached`] the embedded order reserves are
/// used as-is (stale up to one refresh interval; a strategy transferred away
/// since the last cycle may still appear for its former owner). In
/// [`BalanceMode::Live`] each candidate is re-read and the owner and
/// activity checks are re-applied to the fresh state, at the cost of one
/// extra read per owned position.
pub struct BalanceResolver {
    chain: Arc<dyn StrategyReader>,
    registry: Arc<TokenRegistry>,
    repo: Arc<Repository>,
    network: String,
    mode: BalanceMode,
}

impl BalanceResolver {
    pub fn new(
        chain: Arc<dyn StrategyReader>,
        registry: Arc<TokenRegistry>,
        repo: Arc<Repository>,
        network: String,
        mode: BalanceMode,
    ) -> Self {
        Self {
            chain,
            registry,
            repo,
            network,
            mode,
        }
    }

    /// USD-valued, UI-ready balances for every position the address owns.
    pub async fn display_balances(
        &self,
        address: Address,
    ) -> Result<Vec<DisplayPositionBalance>, BalancesError> {
        Ok(self.resolve(address).await?.iter().map(to_display).collect())
    }

    /// Identity-keyed integer balances for every position the address owns.
    pub async fn raw_balances(
        &self,
        address: Address,
    ) -> Result<Vec<RawPositionBalance>, BalancesError> {
        Ok(self.resolve(address).await?.iter().map(to_raw).collect())
    }

    /// Resolve current order reserves for every position owned by `address`.
    async fn resolve(&self, address: Address) -> Result<Vec<ResolvedPosition>, BalancesError> {
        // The zero address never holds anything; do not touch the chain.
        if address == Address::ZERO {
            return Ok(Vec::new());
        }

        if self.repo.latest_cycle().await?.is_none() {
            return Err(BalancesError::NotReady);
        }

        let owned = self.repo.definitions_for_owner(&address).await?;
        debug!(owner = %address, candidates = owned.len(), "resolving balances");

        let current = match self.mode {
            BalanceMode::Cached => owned,
            BalanceMode::Live => self.refresh_owned(address, owned).await?,
        };

        let mut resolved = Vec::with_capacity(current.len());
        for definition in current {
            resolved.push(self.materialize(definition).await?);
        }
        Ok(resolved)
    }

    /// Re-read each candidate strategy and keep only those still owned by
    /// `address` and still active at read time.
    async fn refresh_owned(
        &self,
        address: Address,
        owned: Vec<StrategyDefinition>,
    ) -> Result<Vec<StrategyDefinition>, BalancesError> {
        let reads = owned
            .iter()
            .map(|definition| self.chain.read_strategy(definition.strategy.id));
        let fresh = try_join_all(reads).await?;

        Ok(owned
            .into_iter()
            .zip(fresh)
            .filter(|(_, strategy)| strategy.owner == address && strategy.is_active())
            .map(|(definition, strategy)| StrategyDefinition {
                controller: definition.controller,
                strategy,
            })
            .collect())
    }

    /// Materialize one position and normalize both legs from the definition's
    /// order reserves.
    async fn materialize(
        &self,
        definition: StrategyDefinition,
    ) -> Result<ResolvedPosition, BalancesError> {
        let underlying = underlying_tokens(&definition, &self.network);
        let raw = definition.strategy.reserves();

        let (leg0, leg1) = tokio::try_join!(
            self.normalize_leg(&underlying[0], raw[0]),
            self.normalize_leg(&underlying[1], raw[1]),
        )?;
        let ((info0, normalized0), (info1, normalized1)) = (leg0, leg1);

        let tokens = [
            PositionToken {
                address: info0.address,
                symbol: info0.symbol,
                decimals: info0.decimals,
                meta_role: underlying[0].meta_role,
            },
            PositionToken {
                address: info1.address,
                symbol: info1.symbol,
                decimals: info1.decimals,
                meta_role: underlying[1].meta_role,
            },
        ];

        let position = Position::new(self.network.clone(), definition, tokens);
        Ok(ResolvedPosition {
            position,
            raw,
            legs: [normalized0, normalized1],
        })
    }

    async fn normalize_leg(
        &self,
        leg: &UnderlyingToken,
        raw: u128,
    ) -> Result<(TokenInfo, NormalizedBalance), BalancesError> {
        let is_debt = leg.meta_role == MetaRole::Borrowed;
        Ok(self.registry.normalize_balance(leg.address, raw, is_debt).await?)
    }
}

fn to_display(resolved: &ResolvedPosition) -> DisplayPositionBalance {
    let position = &resolved.position;
    let tokens = [0, 1].map(|i| DisplayTokenBalance {
        address: position.tokens[i].address,
        symbol: position.tokens[i].symbol.clone(),
        decimals: position.tokens[i].decimals,
        meta_role: position.tokens[i].meta_role,
        balance_raw: resolved.raw[i].to_string(),
        amount: resolved.legs[i].amount,
        balance_usd: resolved.legs[i].balance_usd,
    });

    DisplayPositionBalance {
        key: position.key.clone(),
        label: position.label(),
        network: position.network.clone(),
        balance_usd: resolved.legs[0].balance_usd + resolved.legs[1].balance_usd,
        tokens,
    }
}

fn to_raw(resolved: &ResolvedPosition) -> RawPositionBalance {
    RawPositionBalance {
        key: resolved.position.key.clone(),
        tokens: [0, 1].map(|i| RawTokenBalance {
            key: resolved.position.leg_key(i),
            balance: resolved.raw[i].to_string(),
        }),
    }
}
