//! Bitget API Client
//!
//! Last price (`lastPr`) from the v2 spot market tickers endpoint.

use super::price_source::{parse_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.bitget.com/api/v2";
const SOURCE_ID: &str = "bitget";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(50);
const SUCCESS_CODE: &str = "00000";

pub struct BitgetClient {
    rest: RestClient,
}

impl BitgetClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    fn to_symbol(symbol: &MarketSymbol) -> String {
        format!("{}{}", symbol.base_upper(), symbol.quote_upper())
    }

    fn extract_last(response: BitgetResponse, market: &str) -> Result<f64, SourceError> {
        if response.code != SUCCESS_CODE {
            return Err(SourceError::api(
                SOURCE_ID,
                format!("{} {}", response.code, response.msg),
            ));
        }

        match response.data.first() {
            Some(ticker) => parse_price(SOURCE_ID, market, &ticker.last_pr),
            None => Err(SourceError::missing_price(SOURCE_ID, market)),
        }
    }
}

#[async_trait]
impl PriceSource for BitgetClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_symbol(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let market = Self::to_symbol(symbol);
        let url = format!("{}/spot/market/tickers", BASE_URL);

        let response: BitgetResponse = self
            .rest
            .get_json(&url, &[("symbol", market.as_str())])
            .await?;
        Self::extract_last(response, &market)
    }
}

#[derive(Debug, Deserialize)]
struct BitgetResponse {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<BitgetTicker>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BitgetTicker {
    #[serde(default)]
    last_pr: String,
}
