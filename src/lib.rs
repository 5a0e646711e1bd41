//! # Market Dashboard SDK
//!
//! Keeps a cryptocurrency dashboard in sync with an off-chain market data
//! provider (CoinGecko by default): a snapshot table of prices and 24h change,
//! a searchable asset selector, and a 7-day price chart for the selected asset.
//!
//! ## Usage
//!
//! ```no_run
//! use market_dashboard_sdk::{CurrencyCode, DashboardConfig, MarketDashboard};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dashboard = MarketDashboard::coingecko(DashboardConfig::default())?;
//! dashboard.start();
//!
//! // Inbound calls return immediately; fetches run in the background
//! let pending = dashboard.select_asset("ethereum")?;
//! dashboard.change_currency(CurrencyCode::Eur);
//!
//! // The first selection was superseded, so its result is dropped
//! println!("{:?}", pending.outcome().await?);
//!
//! let view = dashboard.view();
//! if let Some(series) = view.history_state.data() {
//!     println!("{}: {} points", series.title, series.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! search / select_asset / change_currency
//!     ↓
//! SelectionController (selection + generation)
//!     ↓
//! FetchStateMachine (history / snapshot, stale results dropped)
//!     ↓
//! MarketDataClient (CoinGecko)
//!     ↓
//! TimeSeriesTransformer
//!     ↓
//! DashboardView (watch channel) → your UI
//! ```
//!
//! ## Configuration
//!
//! Defaults live in the `constants` module. `DashboardConfig::from_env()`
//! accepts `MARKET_DATA_API_URL`, `MARKET_DATA_DEFAULT_ASSET`,
//! `MARKET_DATA_DEFAULT_CURRENCY` and `MARKET_DATA_REFRESH_SECS`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod fetch_state;
pub mod format;
pub mod provider;
pub mod providers;
pub mod selection;
pub mod transform;
pub mod types;

// Re-export commonly used types
pub use catalog::AssetCatalog;
pub use config::DashboardConfig;
pub use dashboard::{FetchHandle, FetchHandles, MarketDashboard};
pub use error::{DashboardError, ProviderError};
pub use fetch_state::FetchStateMachine;
pub use provider::MarketDataClient;
pub use selection::SelectionController;
pub use transform::TimeSeriesTransformer;
pub use types::{
    Asset, ChartSeries, Concern, CurrencyCode, DashboardEvent, DashboardView, FetchOutcome,
    FetchState, PricePoint, Selection, SelectionChange, SnapshotEntry,
};
