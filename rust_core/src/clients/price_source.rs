//! Price Source Trait
//!
//! Defines the common interface for exchange price sources: given a unified
//! market symbol, return the last traded price or fail. Every built-in
//! exchange client implements it, and tests substitute in-process fakes.

use crate::errors::SourceError;
use crate::models::MarketSymbol;
use async_trait::async_trait;
use std::time::Duration;

/// Default per-call timeout, also used as the bounded-fetch deadline.
pub const DEFAULT_TIMEOUT_MS: u64 = 4000;

/// Construction settings shared by every source in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceConfig {
    /// Space requests per client by the exchange's minimum interval
    pub rate_limit_enabled: bool,
    /// HTTP client timeout for a single request
    pub timeout: Duration,
}

impl SourceConfig {
    pub fn new(rate_limit_enabled: bool, timeout: Duration) -> Self {
        Self {
            rate_limit_enabled,
            timeout,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            rate_limit_enabled: true,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Common trait for last-price sources
///
/// Implementations must be Send + Sync; a single handle is shared by every
/// concurrent fetch issued against that source.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Stable lowercase identifier (e.g. "binance", "kraken")
    fn source_id(&self) -> &str;

    /// Convert a unified symbol to this source's market identifier
    ///
    /// Examples:
    /// - Binance: BTC/USDT -> "BTCUSDT"
    /// - Coinbase: BTC/USDT -> "BTC-USDT"
    /// - Kraken: BTC/USDT -> "XBTUSDT"
    fn market_id(&self, symbol: &MarketSymbol) -> String;

    /// Fetch the last traded price for a market
    ///
    /// # Returns
    /// * `Ok(price)` - a finite, strictly positive last-trade price
    /// * `Err` - unsupported market, transport/API error, or no usable price
    async fn fetch_last_price(&self, symbol: &MarketSymbol) -> Result<f64, SourceError>;
}

/// Accept only finite, strictly positive prices
pub fn validate_price(source_id: &str, market: &str, price: f64) -> Result<f64, SourceError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(SourceError::missing_price(source_id, market))
    }
}

/// Parse a decimal string price as returned by most exchange tickers
pub fn parse_price(source_id: &str, market: &str, raw: &str) -> Result<f64, SourceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SourceError::missing_price(source_id, market));
    }
    let price: f64 = trimmed
        .parse()
        .map_err(|_| SourceError::parse(source_id, format!("invalid price {:?}", raw)))?;
    validate_price(source_id, market, price)
}
