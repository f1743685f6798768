//! Crypto.com Exchange API Client
//!
//! Latest trade price (`a`) from the v1 public get-tickers method.

use super::price_source::{parse_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.crypto.com/exchange/v1/public";
const SOURCE_ID: &str = "cryptocom";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(10);

pub struct CryptocomClient {
    rest: RestClient,
}

impl CryptocomClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    fn to_instrument(symbol: &MarketSymbol) -> String {
        format!("{}_{}", symbol.base_upper(), symbol.quote_upper())
    }

    fn extract_last(response: CryptocomResponse, instrument: &str) -> Result<f64, SourceError> {
        if response.code != 0 {
            return Err(SourceError::api(
                SOURCE_ID,
                format!("{} {}", response.code, response.message.unwrap_or_default()),
            ));
        }

        let last = response
            .result
            .and_then(|r| r.data.into_iter().next())
            .and_then(|t| t.a);

        match last {
            Some(price) => parse_price(SOURCE_ID, instrument, &price),
            None => Err(SourceError::missing_price(SOURCE_ID, instrument)),
        }
    }
}

#[async_trait]
impl PriceSource for CryptocomClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_instrument(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let instrument = Self::to_instrument(symbol);
        let url = format!("{}/get-tickers", BASE_URL);

        let response: CryptocomResponse = self
            .rest
            .get_json(&url, &[("instrument_name", instrument.as_str())])
            .await?;
        Self::extract_last(response, &instrument)
    }
}

#[derive(Debug, Deserialize)]
struct CryptocomResponse {
    code: i64,
    message: Option<String>,
    result: Option<CryptocomResult>,
}

#[derive(Debug, Deserialize)]
struct CryptocomResult {
    #[serde(default)]
    data: Vec<CryptocomTicker>,
}

#[derive(Debug, Deserialize)]
struct CryptocomTicker {
    /// Latest trade price; null when the instrument has not traded
    a: Option<String>,
}
