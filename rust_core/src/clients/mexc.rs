//! MEXC API Client
//!
//! MEXC's spot v3 API mirrors Binance's ticker/price endpoint.

use super::price_source::{parse_price, PriceSource, SourceConfig};
use super::rest::RestClient;
use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.mexc.com/api/v3";
const SOURCE_ID: &str = "mexc";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(50);

pub struct MexcClient {
    rest: RestClient,
}

impl MexcClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self {
            rest: RestClient::new(SOURCE_ID, config, MIN_REQUEST_INTERVAL)?,
        })
    }

    fn to_symbol(symbol: &MarketSymbol) -> String {
        format!("{}{}", symbol.base_upper(), symbol.quote_upper())
    }
}

#[async_trait]
impl PriceSource for MexcClient {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn market_id(&self, symbol: &MarketSymbol) -> String {
        Self::to_symbol(symbol)
    }

    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError> {
        let market = Self::to_symbol(symbol);
        let url = format!("{}/ticker/price", BASE_URL);

        let ticker: MexcTickerPrice = self
            .rest
            .get_json(&url, &[("symbol", market.as_str())])
            .await?;
        parse_price(SOURCE_ID, &market, &ticker.price)
    }
}

#[derive(Debug, Deserialize)]
struct MexcTickerPrice {
    price: String,
}
