//! Bitfinex API Client
//!
//! Last price from the v2 public ticker endpoint. Bitfinex answers with a
//! positional array rather than an object and names Tether `UST`.
//!
//! Rate limits: 90 requests/minute on ticker endpoints

use super::price_source::{validate_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "https://api-pub.bitfinex.com/v2";
const SOURCE_ID: &str = "bitfinex";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(667);

/// [BID, BID_SIZE, ASK, ASK_SIZE, DAILY_CHANGE, DAILY_CHANGE_RELATIVE, LAST_PRICE, ...]
const LAST_PRICE_INDEX: usize = 6;

pub struct BitfinexClient {
    rest: RestClient,
}

impl BitfinexClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    fn currency_code(currency: &str) -> String {
        match currency.to_uppercase().as_str() {
            "USDT" => "UST".to_string(),
            other => other.to_string(),
        }
    }

    /// Convert symbol to Bitfinex trading pair (e.g., BTC/USDT -> tBTCUST)
    ///
    /// Codes longer than three characters need a colon separator
    /// (DOGE/USDT -> tDOGE:UST).
    fn to_pair(symbol: &MarketSymbol) -> String {
        let base = Self::currency_code(&symbol.base);
        let quote = Self::currency_code(&symbol.quote);
        if base.len() > 3 || quote.len() > 3 {
            format!("t{}:{}", base, quote)
        } else {
            format!("t{}{}", base, quote)
        }
    }

    fn extract_last(body: &[Value], pair: &str) -> Result<f64, SourceError> {
        // Errors come back as ["error", code, "message"]
        if body.first().and_then(Value::as_str) == Some("error") {
            let message = body
                .get(2)
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(SourceError::api(SOURCE_ID, message));
        }

        match body.get(LAST_PRICE_INDEX).and_then(Value::as_f64) {
            Some(last) => validate_price(SOURCE_ID, pair, last),
            None => Err(SourceError::missing_price(SOURCE_ID, pair)),
        }
    }
}

#[async_trait]
impl PriceSource for BitfinexClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_pair(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let pair = Self::to_pair(symbol);
        let url = format!("{}/ticker/{}", BASE_URL, pair);

        let body: Vec<Value> = self.rest.get_json(&url, &[]).await?;
        Self::extract_last(&body, &pair)
    }
}
