pub mod coingecko;
pub mod etherscan;
pub mod queries;
pub mod subgraph;

use async_trait::async_trait;
use common::{
    models::{CoinDetail, EthPrice, Pair, Token, TokenDetail, TransferRecord},
    Result,
};

pub use subgraph::FetchPolicy;

/// Read access to the exchange subgraph
#[async_trait]
pub trait SubgraphConnector: Send + Sync {
    /// Top tokens by USD trade volume
    async fn get_tokens(&self, policy: FetchPolicy) -> Result<Vec<Token>>;

    /// Top pairs by tracked ETH reserve
    async fn get_pairs(&self, policy: FetchPolicy) -> Result<Vec<Pair>>;

    /// Current ETH/USD price from the bundle
    async fn get_eth_price(&self, policy: FetchPolicy) -> Result<EthPrice>;

    /// One token, optionally at a past block, with the pairs it trades in
    async fn get_token_detail(&self, address: &str, block: Option<u64>) -> Result<TokenDetail>;

    /// Drop every cached response so the next queries hit the network
    async fn clear_cache(&self);
}

/// Source of extended coin metadata
#[async_trait]
pub trait MarketDataConnector: Send + Sync {
    async fn get_coin_detail(&self, coin_id: &str) -> Result<CoinDetail>;
}

/// Source of recent token transfers for an address
#[async_trait]
pub trait ExplorerConnector: Send + Sync {
    /// Most recent transfers first, at most ten
    async fn get_transfers(&self, address: &str) -> Result<Vec<TransferRecord>>;
}
