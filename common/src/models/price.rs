use crate::numeric;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ETH/USD price read from the subgraph bundle
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EthPrice {
    /// Raw decimal string as returned by the subgraph
    pub usd: String,
}

impl EthPrice {
    pub fn new(usd: impl Into<String>) -> Self {
        Self { usd: usd.into() }
    }

    pub fn value(&self) -> Option<Decimal> {
        numeric::parse_decimal(&self.usd)
    }
}

/// Token subset embedded in a pair
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PairToken {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub total_liquidity: String,
    #[serde(rename = "derivedETH")]
    pub derived_eth: String,
}

/// Liquidity pool between two tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Pair {
    pub id: String,
    pub tx_count: String,
    pub token0: PairToken,
    pub token1: PairToken,
    pub reserve0: String,
    pub reserve1: String,
    #[serde(rename = "reserveUSD")]
    pub reserve_usd: String,
    pub total_supply: String,
    #[serde(rename = "trackedReserveETH")]
    pub tracked_reserve_eth: String,
    #[serde(rename = "reserveETH")]
    pub reserve_eth: String,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: String,
    pub token0_price: String,
    pub token1_price: String,
    /// Unix seconds, string-encoded
    pub created_at_timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pair_decodes_subgraph_field_names() {
        let pair: Pair = serde_json::from_value(json!({
            "id": "0xpair",
            "txCount": "42",
            "token0": { "id": "0xa", "symbol": "USDC", "name": "USD Coin", "derivedETH": "0.0005" },
            "token1": { "id": "0xb", "symbol": "WETH" },
            "reserveUSD": "1000.5",
            "trackedReserveETH": "12",
            "token0Price": "0.0005",
            "createdAtTimestamp": "1589000000"
        }))
        .unwrap();

        assert_eq!(pair.token0.derived_eth, "0.0005");
        assert_eq!(pair.token1.name, "");
        assert_eq!(pair.reserve_usd, "1000.5");
        assert_eq!(pair.tracked_reserve_eth, "12");
        assert_eq!(pair.created_at_timestamp, "1589000000");
    }

    #[test]
    fn eth_price_parses_value() {
        assert_eq!(EthPrice::new("3000.5").value(), Some(Decimal::new(30005, 1)));
        assert_eq!(EthPrice::new("").value(), None);
    }
}
