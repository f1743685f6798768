//! Shared REST plumbing for the exchange clients
//!
//! Wraps a `reqwest::Client` carrying the per-call timeout together with the
//! client's [`Throttle`], and maps HTTP failures onto [`SourceError`].

use super::price_source::SourceConfig;
use super::throttle::Throttle;
use crate::errors::SourceError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "GapCex/1.0";

/// HTTP client + throttle for one exchange
pub struct RestClient {
    source_id: &'static str,
    client: Client,
    throttle: Throttle,
}

impl RestClient {
    /// Build a client for `source_id`
    ///
    /// `min_interval` is the exchange's minimum request spacing, applied
    /// only when the config enables rate limiting.
    pub fn new(
        source_id: &'static str,
        config: &SourceConfig,
        min_interval: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SourceError::construction(source_id, e))?;

        let throttle = if config.rate_limit_enabled {
            Throttle::new(min_interval)
        } else {
            Throttle::disabled()
        };

        Ok(Self {
            source_id,
            client,
            throttle,
        })
    }

    pub fn source_id(&self) -> &'static str {
        self.source_id
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// GET `url` with `query` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        self.throttle.acquire().await;

        debug!("Fetching {} from {}", url, self.source_id);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|error| SourceError::Transport {
                source_id: self.source_id.to_string(),
                error,
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited {
                source_id: self.source_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                source_id: self.source_id.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|error| {
            if error.is_timeout() {
                SourceError::Transport {
                    source_id: self.source_id.to_string(),
                    error,
                }
            } else {
                SourceError::parse(self.source_id, error)
            }
        })
    }
}
