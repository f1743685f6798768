//! Spread Ranker
//!
//! Turns a frozen [`PriceBook`] into opportunities ordered by relative
//! spread. Ranking is a pure function of the book.

use crate::book::PriceBook;
use crate::models::{Observation, Opportunity};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpreadRanker {
    /// Keep only spreads strictly above this percentage
    min_spread_pct: Option<f64>,
}

impl SpreadRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_spread(min_spread_pct: Option<f64>) -> Self {
        Self { min_spread_pct }
    }

    pub fn min_spread_pct(&self) -> Option<f64> {
        self.min_spread_pct
    }

    /// Low/high/spread for one asset, or None with fewer than two observations
    ///
    /// spread_pct = (high - low) / low * 100
    pub fn evaluate(&self, asset: &str, observations: &[Observation]) -> Option<Opportunity> {
        if observations.len() < 2 {
            return None;
        }

        let mut sorted: Vec<&Observation> = observations.iter().collect();
        sorted.sort_by(|a, b| a.price.total_cmp(&b.price));

        let low = sorted[0];
        let high = sorted[sorted.len() - 1];
        let spread_pct = (high.price - low.price) / low.price * 100.0;

        Some(Opportunity {
            asset: asset.to_string(),
            low: low.clone(),
            high: high.clone(),
            spread_pct,
            observation_count: observations.len(),
        })
    }

    /// Rank every qualifying asset by spread, widest first
    ///
    /// The sort is stable, so equal spreads keep basket order.
    pub fn rank(&self, book: &PriceBook) -> Vec<Opportunity> {
        let mut opportunities: Vec<Opportunity> = book
            .iter()
            .filter_map(|(asset, observations)| self.evaluate(asset, observations))
            .filter(|opp| match self.min_spread_pct {
                Some(threshold) => opp.spread_pct > threshold,
                None => true,
            })
            .collect();

        opportunities.sort_by(|a, b| b.spread_pct.total_cmp(&a.spread_pct));
        opportunities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> PriceBook {
        PriceBook::from_observations(
            &["BTC", "ETH", "SOL", "XRP"],
            vec![
                Observation::new("a", "BTC", 100.0),
                Observation::new("b", "BTC", 102.0),
                Observation::new("c", "BTC", 98.0),
                Observation::new("a", "ETH", 50.0),
                Observation::new("a", "SOL", 150.0),
                Observation::new("b", "SOL", 151.2),
                Observation::new("a", "XRP", 0.5),
                Observation::new("c", "XRP", 0.5),
            ],
        )
    }

    #[test]
    fn test_spread_scenario() {
        let book = PriceBook::from_observations(
            &["BTC", "ETH"],
            vec![
                Observation::new("a", "BTC", 100.0),
                Observation::new("b", "BTC", 102.0),
                Observation::new("c", "BTC", 98.0),
                Observation::new("a", "ETH", 50.0),
            ],
        );

        let ranked = SpreadRanker::new().rank(&book);
        assert_eq!(ranked.len(), 1);

        let btc = &ranked[0];
        assert_eq!(btc.asset, "BTC");
        assert_eq!(btc.low.price, 98.0);
        assert_eq!(btc.low.source, "c");
        assert_eq!(btc.high.price, 102.0);
        assert_eq!(btc.high.source, "b");
        assert_eq!(btc.observation_count, 3);
        assert!((btc.spread_pct - 4.0816).abs() < 1e-3);
    }

    #[test]
    fn test_single_observation_is_excluded() {
        let ranker = SpreadRanker::new();
        assert!(ranker
            .evaluate("ETH", &[Observation::new("a", "ETH", 50.0)])
            .is_none());
        assert!(ranker.evaluate("ETH", &[]).is_none());
    }

    #[test]
    fn test_ranking_is_sorted_and_bounded() {
        let ranked = SpreadRanker::new().rank(&book());

        let assets: Vec<&str> = ranked.iter().map(|o| o.asset.as_str()).collect();
        assert_eq!(assets, vec!["BTC", "SOL", "XRP"]);

        for pair in ranked.windows(2) {
            assert!(pair[0].spread_pct >= pair[1].spread_pct);
        }
        for opp in &ranked {
            assert!(opp.low.price <= opp.high.price);
            assert!(opp.spread_pct >= 0.0);
        }
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let book = book();
        let ranker = SpreadRanker::new();
        assert_eq!(ranker.rank(&book), ranker.rank(&book));
    }

    #[test]
    fn test_min_spread_threshold() {
        let ranker = SpreadRanker::with_min_spread(Some(0.5));
        let ranked = ranker.rank(&book());

        // XRP has a zero spread
        let assets: Vec<&str> = ranked.iter().map(|o| o.asset.as_str()).collect();
        assert_eq!(assets, vec!["BTC", "SOL"]);

        let strict = SpreadRanker::with_min_spread(Some(5.0));
        assert!(strict.rank(&book()).is_empty());
    }

    #[test]
    fn test_equal_spreads_keep_basket_order() {
        let book = PriceBook::from_observations(
            &["ETH", "BTC"],
            vec![
                Observation::new("a", "BTC", 100.0),
                Observation::new("b", "BTC", 110.0),
                Observation::new("a", "ETH", 10.0),
                Observation::new("b", "ETH", 11.0),
            ],
        );

        let ranked = SpreadRanker::new().rank(&book);
        assert_eq!(ranked[0].asset, "ETH");
        assert_eq!(ranked[1].asset, "BTC");
    }
}
