use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::domain::{underlying_tokens, MetaRole, StrategyDefinition};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionDto {
    pub controller: String,
    pub strategy_id: String,
    pub owner: String,
    pub tokens: [TokenDto; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDto {
    pub address: String,
    pub meta_role: String,
    pub network: String,
}

fn to_dto(definition: &StrategyDefinition, network: &str) -> DefinitionDto {
    let tokens = underlying_tokens(definition, network).map(|leg| TokenDto {
        address: format!("{:#x}", leg.address),
        meta_role: match leg.meta_role {
            MetaRole::Supplied => "supplied".to_string(),
            MetaRole::Borrowed => "borrowed".to_string(),
        },
        network: leg.network,
    });

    DefinitionDto {
        controller: format!("{:#x}", definition.controller),
        strategy_id: definition.strategy.id.to_string(),
        owner: format!("{:#x}", definition.strategy.owner),
        tokens,
    }
}

/// The definition set from the last discovery cycle.
pub async fn get_definitions(
    State(state): State<AppState>,
) -> Result<Json<Vec<DefinitionDto>>, AppError> {
    let definitions = state.repo.list_definitions().await?;
    let network = &state.config.network;
    Ok(Json(
        definitions.iter().map(|d| to_dto(d, network)).collect(),
    ))
}
