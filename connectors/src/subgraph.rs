use crate::queries::{self, GraphQlRequest};
use crate::SubgraphConnector;
use async_trait::async_trait;
use common::{
    models::{EthPrice, Pair, Token, TokenDetail},
    Error, Result,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use store::QueryCache;
use tracing::{debug, error, warn};

pub const UNISWAP_V2_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v2";

/// Whether a query may be answered from the response cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Serve a cached response when one exists, otherwise hit the network
    #[default]
    CacheFirst,
    /// Always hit the network; a success still refreshes the cache
    NetworkOnly,
}

pub struct SubgraphClient {
    client: reqwest::Client,
    endpoint: String,
    cache: QueryCache,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Bundle {
    #[serde(rename = "ethPrice", default)]
    eth_price: String,
}

#[derive(Debug, Deserialize)]
struct PairId {
    id: String,
}

impl SubgraphClient {
    pub fn new() -> Self {
        Self::with_endpoint(UNISWAP_V2_SUBGRAPH_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            cache: QueryCache::new(),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Run a request and return its `data` member.
    ///
    /// Only successful responses are cached; GraphQL errors, non-2xx
    /// statuses and transport failures are returned to the caller.
    pub async fn execute(&self, request: &GraphQlRequest, policy: FetchPolicy) -> Result<Value> {
        let key = QueryCache::key(&request.query, request.variables.as_ref());

        if policy == FetchPolicy::CacheFirst {
            if let Some(data) = self.cache.get(&key).await {
                debug!("Serving {} query from cache", request.operation());
                return Ok(data);
            }
        }

        debug!("Executing {} query against {}", request.operation(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::HttpError(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Subgraph error: {} - {}", status, error_text);
            return Err(Error::UpstreamError(format!(
                "Subgraph error: {} - {}",
                status, error_text
            )));
        }

        let body: GraphQlResponse = response.json().await.map_err(|e| {
            Error::ParseError(format!("Failed to parse subgraph response: {}", e.without_url()))
        })?;

        if !body.errors.is_empty() {
            let messages = body
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            error!("{} query failed: {}", request.operation(), messages);
            return Err(Error::GraphQlError(messages));
        }

        let data = body
            .data
            .filter(|data| !data.is_null())
            .ok_or_else(|| Error::GraphQlError("Response carried no data".to_string()))?;

        self.cache.insert(key, data.clone()).await;
        Ok(data)
    }
}

impl Default for SubgraphClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode `data[field]` as a list, skipping entries that do not fit `T`.
fn decode_list<T: DeserializeOwned>(data: &Value, field: &str) -> Vec<T> {
    let Some(items) = data.get(field).and_then(Value::as_array) else {
        warn!("Response has no '{}' list", field);
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Skipping malformed {} entry: {}", field, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl SubgraphConnector for SubgraphClient {
    async fn get_tokens(&self, policy: FetchPolicy) -> Result<Vec<Token>> {
        let data = self.execute(&queries::tokens_query(), policy).await?;
        Ok(decode_list(&data, "tokens"))
    }

    async fn get_pairs(&self, policy: FetchPolicy) -> Result<Vec<Pair>> {
        let data = self.execute(&queries::pairs_query(), policy).await?;
        Ok(decode_list(&data, "pairs"))
    }

    async fn get_eth_price(&self, policy: FetchPolicy) -> Result<EthPrice> {
        let data = self.execute(&queries::eth_price_query(), policy).await?;
        let bundles: Vec<Bundle> = decode_list(&data, "bundles");

        bundles
            .into_iter()
            .next()
            .map(|bundle| EthPrice::new(bundle.eth_price))
            .ok_or_else(|| Error::NotFound("ETH price bundle".to_string()))
    }

    async fn get_token_detail(&self, address: &str, block: Option<u64>) -> Result<TokenDetail> {
        let request = queries::token_data_query(address, block);
        let data = self.execute(&request, FetchPolicy::CacheFirst).await?;

        let token = decode_list::<Token>(&data, "tokens").into_iter().next();
        let pair_ids = decode_list::<PairId>(&data, "pairs0")
            .into_iter()
            .chain(decode_list::<PairId>(&data, "pairs1"))
            .map(|pair| pair.id)
            .collect();

        Ok(TokenDetail { token, pair_ids })
    }

    async fn clear_cache(&self) {
        self.cache.clear().await;
        debug!("Cleared subgraph response cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn tokens_body() -> String {
        json!({
            "data": {
                "tokens": [
                    { "id": "0xa", "name": "Alpha", "symbol": "AAA", "derivedETH": "0.01" },
                    { "id": "0xb", "name": "Beta", "symbol": "BBB", "derivedETH": 5 },
                    { "id": "0xc", "name": "Gamma", "symbol": "CCC", "derivedETH": "2" }
                ]
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn skips_malformed_tokens() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "operationName": "tokens" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(tokens_body())
            .create_async()
            .await;

        let client = SubgraphClient::with_endpoint(server.url());
        let tokens = client.get_tokens(FetchPolicy::CacheFirst).await.unwrap();

        let symbols: Vec<_> = tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "CCC"]);
    }

    #[tokio::test]
    async fn repeated_query_is_served_from_cache() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(tokens_body())
            .expect(1)
            .create_async()
            .await;

        let client = SubgraphClient::with_endpoint(server.url());
        let first = client.get_tokens(FetchPolicy::CacheFirst).await.unwrap();
        let second = client.get_tokens(FetchPolicy::CacheFirst).await.unwrap();

        assert_eq!(first, second);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn network_only_bypasses_cache() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(tokens_body())
            .expect(2)
            .create_async()
            .await;

        let client = SubgraphClient::with_endpoint(server.url());
        client.get_tokens(FetchPolicy::CacheFirst).await.unwrap();
        client.get_tokens(FetchPolicy::NetworkOnly).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn graphql_errors_are_not_cached() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "errors": [{ "message": "indexing error" }] }).to_string())
            .expect(2)
            .create_async()
            .await;

        let client = SubgraphClient::with_endpoint(server.url());
        for _ in 0..2 {
            let err = client.get_pairs(FetchPolicy::CacheFirst).await.unwrap_err();
            assert!(matches!(err, Error::GraphQlError(ref msg) if msg == "indexing error"));
        }

        assert!(client.cache().is_empty().await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = SubgraphClient::with_endpoint(server.url());
        let err = client.get_eth_price(FetchPolicy::CacheFirst).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamError(_)));
    }

    #[tokio::test]
    async fn reads_eth_price_from_first_bundle() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": { "bundles": [{ "ethPrice": "3000.5" }] } }).to_string())
            .create_async()
            .await;

        let client = SubgraphClient::with_endpoint(server.url());
        let price = client.get_eth_price(FetchPolicy::CacheFirst).await.unwrap();
        assert_eq!(price, EthPrice::new("3000.5"));
    }

    #[tokio::test]
    async fn empty_bundle_list_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": { "bundles": [] } }).to_string())
            .create_async()
            .await;

        let client = SubgraphClient::with_endpoint(server.url());
        let err = client.get_eth_price(FetchPolicy::CacheFirst).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn token_detail_merges_both_pair_sides() {
        let address = "0x6b175474e89094c44da98b954eedeac495271d0f";
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "tokenData",
                "variables": { "id": address, "block": { "number": 100 } }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": {
                        "tokens": [{ "id": address, "symbol": "DAI" }],
                        "pairs0": [{ "id": "0xp1" }],
                        "pairs1": [{ "id": "0xp2" }, { "id": "0xp3" }]
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SubgraphClient::with_endpoint(server.url());
        let detail = client.get_token_detail(address, Some(100)).await.unwrap();

        assert_eq!(detail.token.map(|t| t.symbol), Some("DAI".to_string()));
        assert_eq!(detail.pair_ids, vec!["0xp1", "0xp2", "0xp3"]);
    }

    #[tokio::test]
    async fn cleared_cache_refetches_token_detail() {
        let address = "0x6b175474e89094c44da98b954eedeac495271d0f";
        let detail_body = |symbol: &str| {
            json!({
                "data": {
                    "tokens": [{ "id": address, "symbol": symbol }],
                    "pairs0": [],
                    "pairs1": []
                }
            })
            .to_string()
        };

        let mut server = Server::new_async().await;
        let old = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(detail_body("OLD"))
            .create_async()
            .await;

        let client = SubgraphClient::with_endpoint(server.url());
        let symbol = |detail: TokenDetail| detail.token.map(|t| t.symbol);
        assert_eq!(symbol(client.get_token_detail(address, None).await.unwrap()).as_deref(), Some("OLD"));

        old.remove_async().await;
        let _new = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(detail_body("NEW"))
            .create_async()
            .await;

        assert_eq!(symbol(client.get_token_detail(address, None).await.unwrap()).as_deref(), Some("OLD"));

        client.clear_cache().await;
        assert!(client.cache().is_empty().await);
        assert_eq!(symbol(client.get_token_detail(address, None).await.unwrap()).as_deref(), Some("NEW"));
    }
}
