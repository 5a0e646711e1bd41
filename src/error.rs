//! Error types for the market dashboard

use thiserror::Error;

/// Errors that can occur when fetching data from the market data provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Response is missing required fields or is not valid JSON
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Request parameters were rejected before anything was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Creates a MalformedPayload error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Creates an Api error from a status code and response body
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }
}

/// Errors returned by inbound dashboard calls
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// Asset id is not part of the catalog
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// Currency code is not supported
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Catalog entries are invalid (duplicate or non-canonical ids)
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The market data client could not be built
    #[error("Client setup failed: {0}")]
    ClientSetup(String),

    /// A configuration value is unusable
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl DashboardError {
    /// Creates an UnknownAsset error
    pub fn unknown_asset(id: &str) -> Self {
        Self::UnknownAsset(id.to_string())
    }

    /// Creates an UnknownCurrency error
    pub fn unknown_currency(code: &str) -> Self {
        Self::UnknownCurrency(code.to_string())
    }
}
