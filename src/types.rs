//! Types for the market dashboard

use crate::error::DashboardError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A catalog entry: canonical lowercase id plus display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// Canonical provider id (e.g. "bitcoin")
    pub id: String,

    /// Human-readable name (e.g. "Bitcoin")
    pub display_name: String,
}

impl Asset {
    /// Create a new asset
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Supported quote currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// Polish Zloty
    Pln,
}

impl CurrencyCode {
    /// Get the uppercase ISO code
    pub fn code(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Pln => "PLN",
        }
    }

    /// Get the code as the provider expects it in `vs_currency`
    pub fn api_code(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "usd",
            CurrencyCode::Eur => "eur",
            CurrencyCode::Gbp => "gbp",
            CurrencyCode::Pln => "pln",
        }
    }

    /// Get all supported currencies
    pub fn all() -> &'static [CurrencyCode] {
        &[
            CurrencyCode::Usd,
            CurrencyCode::Eur,
            CurrencyCode::Gbp,
            CurrencyCode::Pln,
        ]
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CurrencyCode::all()
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DashboardError::unknown_currency(trimmed))
    }
}

/// One row of the market snapshot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Canonical asset id
    pub asset_id: String,

    /// Name reported by the provider
    pub name: String,

    /// Price in the requested currency
    pub current_price: f64,

    /// 24h price change percentage
    pub change_24h_percent: f64,
}

/// A single historical price sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp in milliseconds
    pub timestamp_millis: i64,

    /// Price in the requested currency
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp_millis: i64, price: f64) -> Self {
        Self {
            timestamp_millis,
            price,
        }
    }
}

/// Chart-ready series; `labels[i]` belongs to `values[i]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Series title, e.g. "Bitcoin (USD)"
    pub title: String,

    /// Date labels, one per sample
    pub labels: Vec<String>,

    /// Prices, one per sample
    pub values: Vec<f64>,
}

impl ChartSeries {
    /// Number of samples in the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the series has no samples
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Currently selected asset and currency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub asset_id: String,
    pub currency: CurrencyCode,
}

impl Selection {
    pub fn new(asset_id: impl Into<String>, currency: CurrencyCode) -> Self {
        Self {
            asset_id: asset_id.into(),
            currency,
        }
    }
}

/// A selection together with the generation it was issued under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionChange {
    pub selection: Selection,
    pub generation: u64,
}

/// Independent fetch concerns driven by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concern {
    /// Market snapshot table
    Snapshot,
    /// Price history chart for the selected asset
    History,
}

impl Concern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Concern::Snapshot => "snapshot",
            Concern::History => "history",
        }
    }
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one fetch concern as seen by the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum FetchState<T> {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// Last request succeeded
    Success(T),
    /// Last request failed with this message
    Error(String),
}

impl<T> FetchState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchState::Error(_))
    }

    /// The payload of a successful fetch
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Success(data) => Some(data),
            _ => None,
        }
    }

    /// The message of a failed fetch
    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Get the state name as string
    pub fn status(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Success(_) => "success",
            FetchState::Error(_) => "error",
        }
    }
}

/// Result of completing a fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result was applied to the concern's state
    Applied,
    /// A newer attempt was started meanwhile; the result was dropped
    StaleResultDiscarded { generation: u64, current: u64 },
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied)
    }
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub snapshot_state: FetchState<Vec<SnapshotEntry>>,
    pub history_state: FetchState<ChartSeries>,
    pub filtered_assets: Vec<Asset>,
    pub selection: Selection,
}

/// Dashboard events for the unified event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardEvent {
    /// Selected asset or currency changed
    SelectionChanged {
        id: Uuid,
        selection: Selection,
        generation: u64,
        timestamp: DateTime<Utc>,
    },

    /// A fetch completed and its result was applied
    FetchSucceeded {
        id: Uuid,
        concern: Concern,
        generation: u64,
        timestamp: DateTime<Utc>,
    },

    /// A fetch failed and its error was applied
    FetchFailed {
        id: Uuid,
        concern: Concern,
        generation: u64,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

impl DashboardEvent {
    pub fn selection_changed(change: &SelectionChange) -> Self {
        DashboardEvent::SelectionChanged {
            id: Uuid::new_v4(),
            selection: change.selection.clone(),
            generation: change.generation,
            timestamp: Utc::now(),
        }
    }

    pub fn fetch_succeeded(concern: Concern, generation: u64) -> Self {
        DashboardEvent::FetchSucceeded {
            id: Uuid::new_v4(),
            concern,
            generation,
            timestamp: Utc::now(),
        }
    }

    pub fn fetch_failed(concern: Concern, generation: u64, error_message: String) -> Self {
        DashboardEvent::FetchFailed {
            id: Uuid::new_v4(),
            concern,
            generation,
            error_message,
            timestamp: Utc::now(),
        }
    }

    /// Get the event ID
    pub fn id(&self) -> Uuid {
        match self {
            DashboardEvent::SelectionChanged { id, .. } => *id,
            DashboardEvent::FetchSucceeded { id, .. } => *id,
            DashboardEvent::FetchFailed { id, .. } => *id,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::SelectionChanged { .. } => "SELECTION_CHANGED",
            DashboardEvent::FetchSucceeded { .. } => "FETCH_SUCCEEDED",
            DashboardEvent::FetchFailed { .. } => "FETCH_FAILED",
        }
    }
}

impl fmt::Display for DashboardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardEvent::SelectionChanged {
                selection,
                generation,
                ..
            } => write!(
                f,
                "Selection changed: {} in {} (generation {})",
                selection.asset_id, selection.currency, generation
            ),
            DashboardEvent::FetchSucceeded { concern, .. } => {
                write!(f, "Fetch succeeded: {}", concern)
            }
            DashboardEvent::FetchFailed {
                concern,
                error_message,
                ..
            } => write!(f, "Fetch failed for {}: {}", concern, error_message),
        }
    }
}
