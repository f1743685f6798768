//! Gate.io API Client
//!
//! Last price from the v4 spot tickers endpoint, filtered to one currency pair.

use super::price_source::{parse_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.gateio.ws/api/v4";
const SOURCE_ID: &str = "gateio";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(50);

pub struct GateioClient {
    rest: RestClient,
}

impl GateioClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    fn to_currency_pair(symbol: &MarketSymbol) -> String {
        format!("{}_{}", symbol.base_upper(), symbol.quote_upper())
    }

    fn extract_last(tickers: Vec<GateioTicker>, pair: &str) -> Result<f64, SourceError> {
        tickers
            .into_iter()
            .find(|t| t.currency_pair.eq_ignore_ascii_case(pair))
            .ok_or_else(|| SourceError::missing_price(SOURCE_ID, pair))
            .and_then(|t| parse_price(SOURCE_ID, pair, &t.last))
    }
}

#[async_trait]
impl PriceSource for GateioClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_currency_pair(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let pair = Self::to_currency_pair(symbol);
        let url = format!("{}/spot/tickers", BASE_URL);

        // Unknown pairs are HTTP 400 INVALID_CURRENCY
        let tickers: Vec<GateioTicker> = self
            .rest
            .get_json(&url, &[("currency_pair", pair.as_str())])
            .await?;
        Self::extract_last(tickers, &pair)
    }
}

#[derive(Debug, Deserialize)]
struct GateioTicker {
    currency_pair: String,
    #[serde(default)]
    last: String,
}
