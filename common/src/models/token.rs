use serde::{Deserialize, Serialize};

/// Token snapshot as indexed by the exchange subgraph.
///
/// Numeric fields stay in their wire form (decimal strings) and are parsed
/// at the point of use. Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Token {
    /// Contract address
    pub id: String,
    pub name: String,
    pub symbol: String,
    /// Price denominated in ETH
    #[serde(rename = "derivedETH")]
    pub derived_eth: String,
    pub trade_volume: String,
    #[serde(rename = "tradeVolumeUSD")]
    pub trade_volume_usd: String,
    pub total_liquidity: String,
    pub tx_count: String,
}

/// Result of the parameterized single-token query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenDetail {
    pub token: Option<Token>,
    /// Ids of pairs where the token is token0 or token1, by reserve
    pub pair_ids: Vec<String>,
}
