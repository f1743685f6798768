//! Bybit API Client
//!
//! Spot last price from the Bybit v5 market tickers endpoint.

use super::price_source::{parse_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.bybit.com/v5";
const SOURCE_ID: &str = "bybit";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(20);

pub struct BybitClient {
    rest: RestClient,
}

impl BybitClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    fn to_symbol(symbol: &MarketSymbol) -> String {
        format!("{}{}", symbol.base_upper(), symbol.quote_upper())
    }

    fn extract_last(response: BybitResponse, market: &str) -> Result<f64, SourceError> {
        if response.ret_code != 0 {
            return Err(SourceError::api(
                SOURCE_ID,
                format!("{} {}", response.ret_code, response.ret_msg),
            ));
        }

        match response.result.list.first() {
            Some(ticker) => parse_price(SOURCE_ID, market, &ticker.last_price),
            None => Err(SourceError::missing_price(SOURCE_ID, market)),
        }
    }
}

#[async_trait]
impl PriceSource for BybitClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_symbol(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let market = Self::to_symbol(symbol);
        let url = format!("{}/market/tickers", BASE_URL);

        let response: BybitResponse = self
            .rest
            .get_json(&url, &[("category", "spot"), ("symbol", market.as_str())])
            .await?;
        Self::extract_last(response, &market)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BybitResponse {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    #[serde(default)]
    result: BybitResult,
}

#[derive(Debug, Default, Deserialize)]
struct BybitResult {
    #[serde(default)]
    list: Vec<BybitTicker>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BybitTicker {
    #[serde(default)]
    last_price: String,
}
