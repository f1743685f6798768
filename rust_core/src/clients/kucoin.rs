//! KuCoin API Client
//!
//! Last trade price from the level-1 orderbook endpoint, which carries the
//! most recent fill alongside best bid/ask.

use super::price_source::{parse_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.kucoin.com/api/v1";
const SOURCE_ID: &str = "kucoin";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(10);
const SUCCESS_CODE: &str = "200000";

pub struct KucoinClient {
    rest: RestClient,
}

impl KucoinClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    fn to_symbol(symbol: &MarketSymbol) -> String {
        format!("{}-{}", symbol.base_upper(), symbol.quote_upper())
    }

    /// Unknown symbols return success with `data: null`
    fn extract_last(response: KucoinResponse, market: &str) -> Result<f64, SourceError> {
        if response.code != SUCCESS_CODE {
            return Err(SourceError::api(
                SOURCE_ID,
                format!("{} {}", response.code, response.msg.unwrap_or_default()),
            ));
        }

        match response.data.and_then(|d| d.price) {
            Some(price) => parse_price(SOURCE_ID, market, &price),
            None => Err(SourceError::missing_price(SOURCE_ID, market)),
        }
    }
}

#[async_trait]
impl PriceSource for KucoinClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_symbol(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let market = Self::to_symbol(symbol);
        let url = format!("{}/market/orderbook/level1", BASE_URL);

        let response: KucoinResponse = self
            .rest
            .get_json(&url, &[("symbol", market.as_str())])
            .await?;
        Self::extract_last(response, &market)
    }
}

#[derive(Debug, Deserialize)]
struct KucoinResponse {
    code: String,
    msg: Option<String>,
    data: Option<KucoinLevel1>,
}

#[derive(Debug, Deserialize)]
struct KucoinLevel1 {
    price: Option<String>,
}
