//! Runtime configuration for the market dashboard

use crate::{
    constants::{
        COINGECKO_API_URL, DATE_LABEL_FORMAT, DEFAULT_ASSET_ID, DEFAULT_CURRENCY, ENV_API_URL,
        ENV_DEFAULT_ASSET, ENV_DEFAULT_CURRENCY, ENV_REFRESH_SECS, HISTORY_DAYS,
        REQUEST_TIMEOUT_SECS, USER_AGENT,
    },
    error::DashboardError,
    types::{CurrencyCode, Selection},
};
use std::time::Duration;

/// Dashboard settings
///
/// `Default` gives the compile-time defaults from `constants`.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Provider base URL
    pub api_base_url: String,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// HTTP user agent
    pub user_agent: String,
    /// History window requested for the chart
    pub history_days: u32,
    /// Selection applied when the dashboard starts
    pub default_selection: Selection,
    /// chrono format string for chart labels
    pub date_label_format: String,
    /// Period of the background snapshot refresh; `None` disables it
    pub snapshot_refresh_interval: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: COINGECKO_API_URL.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            history_days: HISTORY_DAYS,
            default_selection: Selection::new(DEFAULT_ASSET_ID, DEFAULT_CURRENCY),
            date_label_format: DATE_LABEL_FORMAT.to_string(),
            snapshot_refresh_interval: None,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by `MARKET_DATA_*` environment variables
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config reading overrides through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.api_base_url = url;
        }

        if let Some(asset) = lookup(ENV_DEFAULT_ASSET) {
            config.default_selection.asset_id = asset.trim().to_lowercase();
        }

        if let Some(currency) = lookup(ENV_DEFAULT_CURRENCY) {
            config.default_selection.currency = currency.parse::<CurrencyCode>()?;
        }

        if let Some(secs) = lookup(ENV_REFRESH_SECS) {
            // 0 or garbage leaves refresh disabled
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    config.snapshot_refresh_interval = Some(Duration::from_secs(secs));
                }
                _ => {
                    tracing::warn!(value = %secs, "Ignoring invalid {}", ENV_REFRESH_SECS);
                }
            }
        }

        Ok(config)
    }
}
