//! OKX API Client
//!
//! Last trade price from the OKX v5 market ticker endpoint.
//!
//! Rate limits: 20 requests/2 seconds (IP-based)

use super::price_source::{parse_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://www.okx.com/api/v5";
const SOURCE_ID: &str = "okx";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// OKX API client implementing PriceSource
pub struct OkxClient {
    rest: RestClient,
}

impl OkxClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    /// Convert symbol to OKX instrument ID (e.g., BTC/USDT -> BTC-USDT)
    fn to_inst_id(symbol: &MarketSymbol) -> String {
        format!("{}-{}", symbol.base_upper(), symbol.quote_upper())
    }

    fn extract_last(response: OkxResponse, inst_id: &str) -> Result<f64, SourceError> {
        // Success is code "0"; unknown instruments come back as 51001
        if response.code != "0" {
            return Err(SourceError::api(
                SOURCE_ID,
                format!("{} {}", response.code, response.msg),
            ));
        }

        match response.data.first() {
            Some(ticker) => parse_price(SOURCE_ID, inst_id, &ticker.last),
            None => Err(SourceError::missing_price(SOURCE_ID, inst_id)),
        }
    }
}

#[async_trait]
impl PriceSource for OkxClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_inst_id(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let inst_id = Self::to_inst_id(symbol);
        let url = format!("{}/market/ticker", BASE_URL);

        let response: OkxResponse = self
            .rest
            .get_json(&url, &[("instId", inst_id.as_str())])
            .await?;
        Self::extract_last(response, &inst_id)
    }
}

#[derive(Debug, Deserialize)]
struct OkxResponse {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<OkxTicker>,
}

#[derive(Debug, Deserialize)]
struct OkxTicker {
    #[serde(default)]
    last: String,
}
