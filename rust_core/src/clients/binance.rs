//! Binance API Client
//!
//! Last trade price from the Binance public spot API.
//! No API key required for public endpoints.
//!
//! Rate limits: 6000 request weight/minute (IP-based), ticker/price costs 2

use super::price_source::{parse_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.binance.com/api/v3";
const SOURCE_ID: &str = "binance";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(50);

/// Binance API client implementing PriceSource
pub struct BinanceClient {
    rest: RestClient,
}

impl BinanceClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    /// Convert symbol to Binance trading pair (e.g., BTC/USDT -> BTCUSDT)
    fn to_trading_pair(symbol: &MarketSymbol) -> String {
        format!("{}{}", symbol.base_upper(), symbol.quote_upper())
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_trading_pair(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let trading_pair = Self::to_trading_pair(symbol);
        let url = format!("{}/ticker/price", BASE_URL);

        let ticker: BinanceTickerPrice = self
            .rest
            .get_json(&url, &[("symbol", trading_pair.as_str())])
            .await?;

        parse_price(SOURCE_ID, &trading_pair, &ticker.price)
    }
}

/// Binance ticker/price response
#[derive(Debug, Deserialize)]
struct BinanceTickerPrice {
    #[allow(dead_code)]
    symbol: String,
    price: String,
}
