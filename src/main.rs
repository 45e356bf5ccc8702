use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use carbonscope::chain::RpcChainClient;
use carbonscope::engine::BalanceResolver;
use carbonscope::orchestration::DiscoveryRefresher;
use carbonscope::pricing::{HttpPriceSource, TokenRegistry};
use carbonscope::{api, config::Config, db::init_db, Repository};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize database and dependencies
    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));
    let chain = Arc::new(RpcChainClient::new(
        config.rpc_url.clone(),
        config.controller_address,
    ));
    let prices = Arc::new(HttpPriceSource::new(config.price_api_url.clone()));
    let registry = Arc::new(TokenRegistry::new(
        chain.clone(),
        prices,
        config.network.clone(),
    ));
    let resolver = Arc::new(BalanceResolver::new(
        chain.clone(),
        registry,
        repo.clone(),
        config.network.clone(),
        config.balance_mode,
    ));

    // Keep the definition set fresh in the background
    let refresher = DiscoveryRefresher::new(
        chain,
        repo.clone(),
        Duration::from_millis(config.refresh_interval_ms),
    );
    tokio::spawn(refresher.run());

    // Create router
    let app = api::create_router(api::AppState::new(repo, resolver, config));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
