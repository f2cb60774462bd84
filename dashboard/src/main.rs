mod config;
mod handler;
mod page;
mod service;
mod view;

use axum::{
    routing::{get, post},
    Router,
};
use config::DashboardConfig;
use connectors::{
    coingecko::CoinGeckoConnector, etherscan::EtherscanConnector, subgraph::SubgraphClient,
    FetchPolicy,
};
use handler::AppState;
use page::PageRenderer;
use service::DashboardService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handler::dashboard_page))
        .route("/select/:token_id", post(handler::select_token))
        .route("/reload", post(handler::reload))
        .route("/api/v1/tokens", get(handler::get_tokens))
        .route("/api/v1/tokens/:address", get(handler::get_token_detail))
        .route("/api/v1/pairs", get(handler::get_pairs))
        .route("/api/v1/eth-price", get(handler::get_eth_price))
        .route("/api/v1/selection", get(handler::get_selection))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    info!("Starting Uniswap V2 dashboard");

    let config = DashboardConfig::from_env();
    if config.etherscan_api_key.is_none() {
        warn!("ETHERSCAN_API_KEY is not set, transfer lookups may be rate limited or rejected");
    }

    let subgraph = Arc::new(SubgraphClient::with_endpoint(config.subgraph_url.clone()));
    let market = Arc::new(CoinGeckoConnector::with_base_url(config.coingecko_url.clone()));
    let explorer = Arc::new(EtherscanConnector::with_base_url(
        config.etherscan_url.clone(),
        config.etherscan_api_key.clone(),
    ));

    let (service, events) =
        DashboardService::new(subgraph, market, explorer, config.coin_detail_gate.clone());
    let _watcher = service.spawn_watcher(events);
    let _initial_load = service.start_load(FetchPolicy::CacheFirst).await;

    let pages = PageRenderer::new().map_err(|e| format!("Failed to build page renderer: {}", e))?;
    let state = AppState {
        service,
        pages: Arc::new(pages),
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid listen address {}:{}: {}", config.host, config.port, e))?;
    info!("Listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app(state).into_make_service())
        .await?;

    Ok(())
}
