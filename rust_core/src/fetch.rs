//! Bounded fetch: one price lookup raced against a deadline.
//!
//! Every lookup settles into exactly one [`FetchOutcome`]. Client errors,
//! unusable prices and deadline expiry are all folded into the outcome and
//! never propagate to the caller.

use crate::clients::PriceSource;
use crate::models::{FetchOutcome, MarketSymbol, Observation};
use std::time::Duration;
use tokio::time::timeout;
use tracing::trace;

/// Fetch the last price of `symbol` from `source`, giving up after `deadline`
///
/// The observation is labelled with `source_id` (the registry identifier)
/// and the symbol's base asset. When the deadline wins, the lookup future is
/// dropped along with any timer it holds.
pub async fn bounded_fetch(
    source: &dyn PriceSource,
    source_id: &str,
    symbol: &MarketSymbol,
    deadline: Duration,
) -> FetchOutcome {
    match timeout(deadline, source.fetch_last_price(symbol)).await {
        Err(_) => {
            trace!("{} {}: deadline of {:?} elapsed", source_id, symbol, deadline);
            FetchOutcome::TimedOut
        }
        Ok(Err(e)) if e.is_timeout() => FetchOutcome::TimedOut,
        Ok(Err(e)) => {
            trace!("{} {}: {}", source_id, symbol, e);
            FetchOutcome::Failed(e.to_string())
        }
        Ok(Ok(price)) if price.is_finite() && price > 0.0 => {
            FetchOutcome::Found(Observation::new(source_id, &symbol.base, price))
        }
        Ok(Ok(price)) => FetchOutcome::Failed(format!("unusable price {}", price)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use async_trait::async_trait;

    enum Behavior {
        Price(f64),
        Error,
        Sleep(Duration),
    }

    struct ScriptedSource(Behavior);

    #[async_trait]
    impl PriceSource for ScriptedSource {
        fn source_id(&self) -> &str {
            "scripted"
        }

        fn market_id(&self, symbol: &MarketSymbol) -> String {
            symbol.to_string()
        }

        async fn fetch_last_price(&self, _symbol: &MarketSymbol) -> Result<f64, SourceError> {
            match self.0 {
                Behavior::Price(p) => Ok(p),
                Behavior::Error => Err(SourceError::api("scripted", "market not found")),
                Behavior::Sleep(d) => {
                    tokio::time::sleep(d).await;
                    Ok(1.0)
                }
            }
        }
    }

    fn btc() -> MarketSymbol {
        MarketSymbol::new("BTC", "USDT")
    }

    #[tokio::test]
    async fn test_found_is_labelled_with_registry_id() {
        let source = ScriptedSource(Behavior::Price(67000.0));
        let outcome = bounded_fetch(&source, "binance", &btc(), Duration::from_secs(1)).await;

        let obs = outcome.into_observation().unwrap();
        assert_eq!(obs.source, "binance");
        assert_eq!(obs.asset, "BTC");
        assert_eq!(obs.price, 67000.0);
    }

    #[tokio::test]
    async fn test_error_becomes_failed() {
        let source = ScriptedSource(Behavior::Error);
        let outcome = bounded_fetch(&source, "okx", &btc(), Duration::from_secs(1)).await;
        assert!(matches!(outcome, FetchOutcome::Failed(reason) if reason.contains("market not found")));
    }

    #[tokio::test]
    async fn test_unusable_prices_are_failed() {
        for price in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let source = ScriptedSource(Behavior::Price(price));
            let outcome = bounded_fetch(&source, "okx", &btc(), Duration::from_secs(1)).await;
            assert!(matches!(outcome, FetchOutcome::Failed(_)), "price {}", price);
        }
    }

    #[tokio::test]
    async fn test_slow_source_times_out_at_deadline() {
        let source = ScriptedSource(Behavior::Sleep(Duration::from_secs(30)));
        let start = std::time::Instant::now();

        let outcome = bounded_fetch(&source, "kraken", &btc(), Duration::from_millis(50)).await;

        assert_eq!(outcome, FetchOutcome::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
