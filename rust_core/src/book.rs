//! Price Book: per-asset observation lists for one run.
//!
//! Written only by the collector's aggregating loop; read-only once the
//! fetch phase ends.

use crate::models::Observation;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use tracing::warn;

/// Observations grouped by asset, in basket order
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    basket: Vec<String>,
    observations: FxHashMap<String, Vec<Observation>>,
}

impl PriceBook {
    /// Empty book for `basket`; duplicate assets are collapsed
    pub fn new<S: AsRef<str>>(basket: &[S]) -> Self {
        let mut assets: Vec<String> = Vec::with_capacity(basket.len());
        for asset in basket {
            let asset = asset.as_ref();
            if !assets.iter().any(|a| a == asset) {
                assets.push(asset.to_string());
            }
        }

        let observations = assets
            .iter()
            .map(|a| (a.clone(), Vec::new()))
            .collect();

        Self {
            basket: assets,
            observations,
        }
    }

    /// Build a book directly from observations
    pub fn from_observations<S: AsRef<str>>(
        basket: &[S],
        observations: impl IntoIterator<Item = Observation>,
    ) -> Self {
        let mut book = Self::new(basket);
        for obs in observations {
            book.record(obs);
        }
        book
    }

    /// Append an observation to its asset's list
    ///
    /// No deduplication by source. Returns false (and drops the
    /// observation) when the asset is not part of the basket.
    pub(crate) fn record(&mut self, obs: Observation) -> bool {
        match self.observations.get_mut(&obs.asset) {
            Some(list) => {
                list.push(obs);
                true
            }
            None => {
                warn!("Dropping observation for {} outside the basket", obs.asset);
                false
            }
        }
    }

    pub fn observations(&self, asset: &str) -> &[Observation] {
        self.observations
            .get(asset)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Assets in basket order
    pub fn assets(&self) -> &[String] {
        &self.basket
    }

    /// (asset, observations) pairs in basket order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Observation])> {
        self.basket
            .iter()
            .map(move |asset| (asset.as_str(), self.observations(asset)))
    }

    pub fn total_observations(&self) -> usize {
        self.observations.values().map(Vec::len).sum()
    }

    /// Sources that produced at least one observation
    pub fn distinct_sources(&self) -> BTreeSet<&str> {
        self.observations
            .values()
            .flatten()
            .map(|obs| obs.source.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.total_observations() == 0
    }
}
