use crate::ExplorerConnector;
use async_trait::async_trait;
use common::{
    models::{TransferRecord, MAX_TRANSFERS},
    Error, Result,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";

const START_BLOCK: &str = "0";
const END_BLOCK: &str = "999999999";

pub struct EtherscanConnector {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl EtherscanConnector {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(ETHERSCAN_API_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }
}

/// Etherscan envelope. `result` is a list on success and a message string
/// on failure.
#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

#[async_trait]
impl ExplorerConnector for EtherscanConnector {
    async fn get_transfers(&self, address: &str) -> Result<Vec<TransferRecord>> {
        debug!("Fetching token transfers from Etherscan for {}", address);

        let mut params = vec![
            ("module", "account"),
            ("action", "tokentx"),
            ("address", address),
            ("startblock", START_BLOCK),
            ("endblock", END_BLOCK),
            ("sort", "desc"),
        ];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("apikey", key));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::HttpError(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Etherscan API error: {} - {}", status, error_text);
            return Err(Error::UpstreamError(format!(
                "Etherscan API error: {} - {}",
                status, error_text
            )));
        }

        let body: EtherscanResponse = response.json().await.map_err(|e| {
            Error::ParseError(format!("Failed to parse Etherscan response: {}", e.without_url()))
        })?;

        let items = match body.result {
            Value::Array(items) => items,
            Value::String(reason) => {
                error!("Etherscan rejected request: {} - {}", body.message, reason);
                return Err(Error::UpstreamError(format!(
                    "Etherscan API error: {} - {}",
                    body.message, reason
                )));
            }
            other => {
                return Err(Error::ParseError(format!(
                    "Unexpected Etherscan result: {}",
                    other
                )))
            }
        };

        // Already sorted newest first by the explorer
        let transfers = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<TransferRecord>(item) {
                Ok(transfer) => Some(transfer),
                Err(e) => {
                    warn!("Skipping malformed transfer: {}", e);
                    None
                }
            })
            .take(MAX_TRANSFERS)
            .collect();

        Ok(transfers)
    }
}
