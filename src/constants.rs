//! Constants for the market dashboard
//!
//! Compile-time defaults. `DashboardConfig::default()` is built from these and
//! `DashboardConfig::from_env()` can override a few of them at startup.

use crate::types::CurrencyCode;

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko endpoint for the market snapshot table
pub const COINGECKO_MARKETS_ENDPOINT: &str = "/coins/markets";

/// CoinGecko endpoint template for price history (`{id}` is replaced)
pub const COINGECKO_MARKET_CHART_ENDPOINT: &str = "/coins/{id}/market_chart";

/// HTTP request timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "market-dashboard-sdk/0.1.0";

/// Length of the price history window (in days)
pub const HISTORY_DAYS: u32 = 7;

/// Asset selected when the dashboard starts
pub const DEFAULT_ASSET_ID: &str = "bitcoin";

/// Currency selected when the dashboard starts
pub const DEFAULT_CURRENCY: CurrencyCode = CurrencyCode::Usd;

/// Default chart label format (day granularity)
pub const DATE_LABEL_FORMAT: &str = "%d.%m.%Y";

/// Assets known to the default catalog: (id, display name)
pub const DEFAULT_ASSETS: &[(&str, &str)] = &[
    ("bitcoin", "Bitcoin"),
    ("ethereum", "Ethereum"),
    ("ripple", "XRP"),
    ("litecoin", "Litecoin"),
];

/// Capacity of the dashboard event broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Environment variable overriding the provider base URL
pub const ENV_API_URL: &str = "MARKET_DATA_API_URL";

/// Environment variable overriding the initially selected asset
pub const ENV_DEFAULT_ASSET: &str = "MARKET_DATA_DEFAULT_ASSET";

/// Environment variable overriding the initially selected currency
pub const ENV_DEFAULT_CURRENCY: &str = "MARKET_DATA_DEFAULT_CURRENCY";

/// Environment variable enabling periodic snapshot refresh (seconds)
pub const ENV_REFRESH_SECS: &str = "MARKET_DATA_REFRESH_SECS";
