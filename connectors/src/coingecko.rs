use crate::MarketDataConnector;
use async_trait::async_trait;
use common::{models::CoinDetail, Error, Result};
use serde_json::Value;
use tracing::{debug, error};

pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoConnector {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoConnector {
    pub fn new() -> Self {
        Self::with_base_url(COINGECKO_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn coin_url(&self, coin_id: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::ConfigError(format!("Invalid CoinGecko URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::ConfigError(format!("CoinGecko URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push("coins")
            .push(coin_id);
        Ok(url)
    }
}

impl Default for CoinGeckoConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataConnector for CoinGeckoConnector {
    async fn get_coin_detail(&self, coin_id: &str) -> Result<CoinDetail> {
        if coin_id.trim().is_empty() {
            return Err(Error::InvalidInput("Coin id is empty".to_string()));
        }

        let url = self.coin_url(coin_id)?;
        debug!("Fetching coin detail from CoinGecko: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[
                ("localization", "false"),
                ("tickers", "true"),
                ("market_data", "true"),
                ("community_data", "true"),
                ("developer_data", "true"),
                ("sparkline", "true"),
            ])
            .send()
            .await
            .map_err(|e| Error::HttpError(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("CoinGecko API error: {} - {}", status, error_text);
            return Err(Error::UpstreamError(format!(
                "CoinGecko API error: {} - {}",
                status, error_text
            )));
        }

        let detail: Value = response.json().await.map_err(|e| {
            Error::ParseError(format!("Failed to parse CoinGecko response: {}", e.without_url()))
        })?;

        Ok(CoinDetail(detail))
    }
}
