//! Kraken API Client
//!
//! Last trade price from the Kraken public Ticker endpoint. Kraken keeps
//! legacy asset codes (XBT for bitcoin, XDG for dogecoin) and reports errors
//! inside a 200 response envelope.
//!
//! Rate limits: roughly 1 public request/second

use super::price_source::{parse_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const BASE_URL: &str = "https://api.kraken.com/0/public";
const SOURCE_ID: &str = "kraken";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1000);

/// Kraken API client implementing PriceSource
pub struct KrakenClient {
    rest: RestClient,
}

impl KrakenClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    /// Map common asset codes to Kraken's legacy codes
    fn asset_code(asset: &str) -> String {
        match asset.to_uppercase().as_str() {
            "BTC" => "XBT".to_string(),
            "DOGE" => "XDG".to_string(),
            other => other.to_string(),
        }
    }

    /// Convert symbol to Kraken pair name (e.g., BTC/USDT -> XBTUSDT)
    fn to_pair(symbol: &MarketSymbol) -> String {
        format!(
            "{}{}",
            Self::asset_code(&symbol.base),
            Self::asset_code(&symbol.quote)
        )
    }

    /// Pull the last trade price out of a Ticker response
    ///
    /// The result is keyed by Kraken's canonical pair name, which may differ
    /// from the requested one (XXBTZUSD for XBTUSD), so the single entry is
    /// taken regardless of its key.
    fn extract_last(response: KrakenResponse, pair: &str) -> Result<f64, SourceError> {
        if let Some(message) = response.error.first() {
            return Err(SourceError::api(SOURCE_ID, message));
        }

        let ticker = response
            .result
            .into_values()
            .next()
            .ok_or_else(|| SourceError::missing_price(SOURCE_ID, pair))?;

        // c = [last trade price, last trade lot volume]
        match ticker.c.first() {
            Some(last) => parse_price(SOURCE_ID, pair, last),
            None => Err(SourceError::missing_price(SOURCE_ID, pair)),
        }
    }
}

#[async_trait]
impl PriceSource for KrakenClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_pair(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let pair = Self::to_pair(symbol);
        let url = format!("{}/Ticker", BASE_URL);

        let response: KrakenResponse = self.rest.get_json(&url, &[("pair", pair.as_str())]).await?;
        Self::extract_last(response, &pair)
    }
}

/// Kraken response envelope
#[derive(Debug, Deserialize)]
struct KrakenResponse {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: HashMap<String, KrakenTicker>,
}

#[derive(Debug, Deserialize)]
struct KrakenTicker {
    #[serde(default)]
    c: Vec<String>,
}
