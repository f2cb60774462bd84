use connectors::{
    coingecko::COINGECKO_API_URL, etherscan::ETHERSCAN_API_URL, subgraph::UNISWAP_V2_SUBGRAPH_URL,
};
use serde::{Deserialize, Serialize};

/// Coin id that enables the coin-detail lookup unless configured otherwise
pub const DEFAULT_COIN_DETAIL_SENTINEL: &str = "open";

/// Decides which selected coins get a market-data lookup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum CoinDetailGate {
    /// Only the coin with this id
    Sentinel(String),
    /// Every selected coin
    Any,
}

impl Default for CoinDetailGate {
    fn default() -> Self {
        CoinDetailGate::Sentinel(DEFAULT_COIN_DETAIL_SENTINEL.to_string())
    }
}

impl CoinDetailGate {
    /// `any` opens the gate for every coin; anything else names the sentinel.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" => Self::default(),
            "any" | "*" => CoinDetailGate::Any,
            sentinel => CoinDetailGate::Sentinel(sentinel.to_string()),
        }
    }

    pub fn allows(&self, coin_id: &str) -> bool {
        match self {
            CoinDetailGate::Sentinel(sentinel) => coin_id == sentinel,
            CoinDetailGate::Any => !coin_id.is_empty(),
        }
    }
}

/// Process configuration. Not `Debug`, so the explorer key cannot end up in
/// a log line.
#[derive(Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    pub subgraph_url: String,
    pub coingecko_url: String,
    pub etherscan_url: String,
    /// Explorer key, injected from the environment only
    #[serde(skip_serializing)]
    pub etherscan_api_key: Option<String>,
    pub coin_detail_gate: CoinDetailGate,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            subgraph_url: UNISWAP_V2_SUBGRAPH_URL.to_string(),
            coingecko_url: COINGECKO_API_URL.to_string(),
            etherscan_url: ETHERSCAN_API_URL.to_string(),
            etherscan_api_key: None,
            coin_detail_gate: CoinDetailGate::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("DASHBOARD_HOST").unwrap_or(defaults.host);
        let port = lookup("DASHBOARD_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let subgraph_url = lookup("SUBGRAPH_URL").unwrap_or(defaults.subgraph_url);
        let coingecko_url = lookup("COINGECKO_API_URL").unwrap_or(defaults.coingecko_url);
        let etherscan_url = lookup("ETHERSCAN_API_URL").unwrap_or(defaults.etherscan_url);
        let etherscan_api_key = lookup("ETHERSCAN_API_KEY").filter(|key| !key.trim().is_empty());
        let coin_detail_gate = lookup("COIN_DETAIL_GATE")
            .map(|raw| CoinDetailGate::parse(&raw))
            .unwrap_or(defaults.coin_detail_gate);

        Self {
            host,
            port,
            subgraph_url,
            coingecko_url,
            etherscan_url,
            etherscan_api_key,
            coin_detail_gate,
        }
    }
}
