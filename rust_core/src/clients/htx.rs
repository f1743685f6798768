//! HTX (formerly Huobi) API Client
//!
//! Last price from the merged market detail endpoint. HTX symbols are
//! lowercase and prices are JSON numbers rather than strings.

use super::price_source::{validate_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.huobi.pro";
const SOURCE_ID: &str = "htx";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

pub struct HtxClient {
    rest: RestClient,
}

impl HtxClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    fn to_symbol(symbol: &MarketSymbol) -> String {
        format!("{}{}", symbol.base, symbol.quote).to_lowercase()
    }

    fn extract_last(response: HtxResponse, market: &str) -> Result<f64, SourceError> {
        if response.status != "ok" {
            return Err(SourceError::api(
                SOURCE_ID,
                response.err_msg.unwrap_or_else(|| response.status.clone()),
            ));
        }

        match response.tick.and_then(|t| t.close) {
            Some(close) => validate_price(SOURCE_ID, market, close),
            None => Err(SourceError::missing_price(SOURCE_ID, market)),
        }
    }
}

#[async_trait]
impl PriceSource for HtxClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_symbol(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let market = Self::to_symbol(symbol);
        let url = format!("{}/market/detail/merged", BASE_URL);

        let response: HtxResponse = self
            .rest
            .get_json(&url, &[("symbol", market.as_str())])
            .await?;
        Self::extract_last(response, &market)
    }
}

#[derive(Debug, Deserialize)]
struct HtxResponse {
    status: String,
    #[serde(rename = "err-msg")]
    err_msg: Option<String>,
    tick: Option<HtxTick>,
}

#[derive(Debug, Deserialize)]
struct HtxTick {
    close: Option<f64>,
}
