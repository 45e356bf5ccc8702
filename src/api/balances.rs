use std::str::FromStr;

use alloy_primitives::Address;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Decimal, DisplayPositionBalance, MetaRole, RawPositionBalance};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct BalancesQuery {
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBalanceDto {
    pub key: String,
    pub label: String,
    pub network: String,
    pub balance_usd: Decimal,
    pub tokens: Vec<DisplayTokenDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTokenDto {
    pub address: String,
    pub symbol: String,
    pub decimals: u32,
    pub meta_role: String,
    pub balance_raw: String,
    pub amount: Decimal,
    pub balance_usd: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBalanceDto {
    pub key: String,
    pub tokens: Vec<RawTokenDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenDto {
    pub key: String,
    pub balance: String,
}

fn parse_address(raw: &str) -> Result<Address, AppError> {
    Address::from_str(raw).map_err(|_| AppError::BadRequest("Invalid address".into()))
}

fn meta_role_str(role: MetaRole) -> &'static str {
    match role {
        MetaRole::Supplied => "supplied",
        MetaRole::Borrowed => "borrowed",
    }
}

fn display_dto(balance: DisplayPositionBalance) -> DisplayBalanceDto {
    DisplayBalanceDto {
        key: balance.key,
        label: balance.label,
        network: balance.network,
        balance_usd: balance.balance_usd,
        tokens: balance
            .tokens
            .into_iter()
            .map(|t| DisplayTokenDto {
                address: format!("{:#x}", t.address),
                symbol: t.symbol,
                decimals: t.decimals,
                meta_role: meta_role_str(t.meta_role).to_string(),
                balance_raw: t.balance_raw,
                amount: t.amount,
                balance_usd: t.balance_usd,
            })
            .collect(),
    }
}

fn raw_dto(balance: RawPositionBalance) -> RawBalanceDto {
    RawBalanceDto {
        key: balance.key,
        tokens: balance
            .tokens
            .into_iter()
            .map(|t| RawTokenDto {
                key: t.key,
                balance: t.balance,
            })
            .collect(),
    }
}

/// USD-valued balances for every position owned by the queried address.
pub async fn get_display_balances(
    Query(params): Query<BalancesQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<DisplayBalanceDto>>, AppError> {
    let address = parse_address(&params.address)?;
    let balances = state.resolver.display_balances(address).await?;
    Ok(Json(balances.into_iter().map(display_dto).collect()))
}

/// Identity-keyed integer balances for every position owned by the queried
/// address.
pub async fn get_raw_balances(
    Query(params): Query<BalancesQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RawBalanceDto>>, AppError> {
    let address = parse_address(&params.address)?;
    let balances = state.resolver.raw_balances(address).await?;
    Ok(Json(balances.into_iter().map(raw_dto).collect()))
}
