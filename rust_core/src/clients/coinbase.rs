//! Coinbase Exchange API Client
//!
//! Last trade price from the Coinbase Exchange public API.
//! No API key required for public endpoints.
//!
//! Rate limits: 10 requests/second (IP-based)

use super::price_source::{parse_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.exchange.coinbase.com";
const SOURCE_ID: &str = "coinbase";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Coinbase Exchange API client implementing PriceSource
pub struct CoinbaseClient {
    rest: RestClient,
}

impl CoinbaseClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    /// Convert symbol to Coinbase product ID (e.g., BTC/USDT -> BTC-USDT)
    fn to_product_id(symbol: &MarketSymbol) -> String {
        format!("{}-{}", symbol.base_upper(), symbol.quote_upper())
    }
}

#[async_trait]
impl PriceSource for CoinbaseClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_product_id(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let product_id = Self::to_product_id(symbol);
        let url = format!("{}/products/{}/ticker", BASE_URL, product_id);

        // Unknown products come back as HTTP 404
        let ticker: CoinbaseTicker = self.rest.get_json(&url, &[]).await?;

        match ticker.price {
            Some(price) => parse_price(SOURCE_ID, &product_id, &price),
            None => Err(SourceError::missing_price(SOURCE_ID, &product_id)),
        }
    }
}

/// Coinbase ticker response
#[derive(Debug, Deserialize)]
struct CoinbaseTicker {
    #[allow(dead_code)]
    trade_id: Option<i64>,
    price: Option<String>,
    #[allow(dead_code)]
    time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_id_conversion() {
        assert_eq!(
            CoinbaseClient::to_product_id(&MarketSymbol::new("BTC", "USDT")),
            "BTC-USDT"
        );
        assert_eq!(
            CoinbaseClient::to_product_id(&MarketSymbol::new("eth", "usd")),
            "ETH-USD"
        );
    }

    #[test]
    fn test_ticker_parsing() {
        let body = json!({
            "trade_id": 86326522,
            "price": "67001.5",
            "size": "0.0012",
            "time": "2026-01-12T10:00:00.000000Z"
        });
        let ticker: CoinbaseTicker = serde_json::from_value(body).unwrap();
        assert_eq!(ticker.price.as_deref(), Some("67001.5"));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_last_price() {
        let client = CoinbaseClient::new(&SourceConfig::default()).unwrap();
        let price = client
            .fetch_last_price(&MarketSymbol::new("BTC", "USDT"))
            .await
            .unwrap();
        assert!(price > 0.0);
    }
}
