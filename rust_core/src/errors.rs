//! Error types for price sources and the scan pipeline.
//!
//! Per-call [`SourceError`]s never cross the bounded-fetch boundary; they are
//! folded into a [`FetchOutcome`](crate::models::FetchOutcome) there. Only the
//! systemic [`ScanError`]s reach the caller of a scan.

use thiserror::Error;

/// Errors raised by an individual price source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The client could not be built (unsupported or misconfigured source).
    #[error("Failed to construct source {source_id}: {reason}")]
    Construction { source_id: String, reason: String },

    /// Transport-level failure (connect, TLS, client timeout, body read).
    #[error("{source_id} request failed: {error}")]
    Transport {
        source_id: String,
        #[source]
        error: reqwest::Error,
    },

    /// Non-success HTTP status other than 429.
    #[error("{source_id} returned HTTP {status}")]
    Status { source_id: String, status: u16 },

    /// HTTP 429 from the exchange.
    #[error("{source_id} rate limited the request")]
    RateLimited { source_id: String },

    /// The exchange answered with an error envelope.
    #[error("{source_id} API error: {message}")]
    Api { source_id: String, message: String },

    /// The body did not have the expected shape.
    #[error("Failed to parse {source_id} response: {message}")]
    Parse { source_id: String, message: String },

    /// The ticker carried no usable last-trade price.
    #[error("{source_id} has no usable last price for {market}")]
    MissingPrice { source_id: String, market: String },
}

impl SourceError {
    /// Whether the failure was the HTTP client's own timeout firing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { error, .. } if error.is_timeout())
    }

    pub fn construction(source_id: &str, reason: impl ToString) -> Self {
        Self::Construction {
            source_id: source_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn api(source_id: &str, message: impl ToString) -> Self {
        Self::Api {
            source_id: source_id.to_string(),
            message: message.to_string(),
        }
    }

    pub fn parse(source_id: &str, message: impl ToString) -> Self {
        Self::Parse {
            source_id: source_id.to_string(),
            message: message.to_string(),
        }
    }

    pub fn missing_price(source_id: &str, market: &str) -> Self {
        Self::MissingPrice {
            source_id: source_id.to_string(),
            market: market.to_string(),
        }
    }
}

/// Systemic failures that abort a scan before any fetch is issued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Asset basket is empty")]
    EmptyBasket,

    #[error("No price sources configured")]
    NoSources,
}
