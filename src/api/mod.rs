pub mod balances;
pub mod definitions;
pub mod health;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::db::Repository;
use crate::engine::BalanceResolver;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub resolver: Arc<BalanceResolver>,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, resolver: Arc<BalanceResolver>, config: Config) -> Self {
        Self {
            repo,
            resolver,
            config,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/definitions", get(definitions::get_definitions))
        .route("/v1/balances", get(balances::get_display_balances))
        .route("/v1/balances/raw", get(balances::get_raw_balances))
        .layer(cors)
        .with_state(state)
}
