//! GraphQL documents for the Uniswap v2 subgraph.
//!
//! The fixed list queries take no input. The single-token query binds the
//! address and block height as variables; it does not check the address,
//! so callers should run [`is_valid_address`] first.

use serde::Serialize;
use serde_json::{json, Value};

/// Rows requested by the token and pair lists
pub const LIST_SIZE: usize = 25;

/// Pairs requested per side by the single-token query
pub const TOKEN_PAIRS_SIZE: usize = 50;

const TOKEN_FIELDS: &str = r#"
  fragment TokenFields on Token {
    id
    name
    symbol
    derivedETH
    tradeVolume
    tradeVolumeUSD
    totalLiquidity
    txCount
  }
"#;

/// A GraphQL-over-HTTP request body
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphQlRequest {
    pub fn new(operation_name: &str, query: String) -> Self {
        Self {
            query,
            variables: None,
            operation_name: Some(operation_name.to_string()),
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn operation(&self) -> &str {
        self.operation_name.as_deref().unwrap_or("anonymous")
    }
}

pub fn tokens_query() -> GraphQlRequest {
    let query = format!(
        r#"{TOKEN_FIELDS}
  query tokens {{
    tokens(first: {LIST_SIZE}, orderBy: tradeVolumeUSD, orderDirection: desc) {{
      ...TokenFields
    }}
  }}
"#
    );
    GraphQlRequest::new("tokens", query)
}

pub fn pairs_query() -> GraphQlRequest {
    let query = format!(
        r#"
  query pairs {{
    pairs(first: {LIST_SIZE}, orderBy: trackedReserveETH, orderDirection: desc) {{
      id
      txCount
      token0 {{
        id
        symbol
        name
        totalLiquidity
        derivedETH
      }}
      token1 {{
        id
        symbol
        name
        totalLiquidity
        derivedETH
      }}
      reserve0
      reserve1
      reserveUSD
      totalSupply
      trackedReserveETH
      reserveETH
      volumeUSD
      token0Price
      token1Price
      createdAtTimestamp
    }}
  }}
"#
    );
    GraphQlRequest::new("pairs", query)
}

pub fn eth_price_query() -> GraphQlRequest {
    let query = r#"
  query bundles {
    bundles(where: { id: "1" }) {
      ethPrice
    }
  }
"#
    .to_string();
    GraphQlRequest::new("bundles", query)
}

/// Token by address, optionally as of `block`, plus the ids of the pairs it
/// belongs to on either side.
pub fn token_data_query(address: &str, block: Option<u64>) -> GraphQlRequest {
    let query = format!(
        r#"{TOKEN_FIELDS}
  query tokenData($id: ID!, $token: String!, $block: Block_height) {{
    tokens(block: $block, where: {{ id: $id }}) {{
      ...TokenFields
    }}
    pairs0: pairs(where: {{ token0: $token }}, first: {TOKEN_PAIRS_SIZE}, orderBy: reserveUSD, orderDirection: desc) {{
      id
    }}
    pairs1: pairs(where: {{ token1: $token }}, first: {TOKEN_PAIRS_SIZE}, orderBy: reserveUSD, orderDirection: desc) {{
      id
    }}
  }}
"#
    );
    let block = block.map(|number| json!({ "number": number }));
    GraphQlRequest::new("tokenData", query).with_variables(json!({
        "id": address,
        "token": address,
        "block": block,
    }))
}

/// `0x` followed by 40 hex digits
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
