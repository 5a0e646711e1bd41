//! Market dashboard service
//!
//! Wires the catalog, selection, client and the two fetch state machines
//! together and publishes a [`DashboardView`] after every transition.

use crate::{
    catalog::AssetCatalog,
    config::DashboardConfig,
    constants::EVENT_CHANNEL_CAPACITY,
    error::{DashboardError, ProviderError},
    fetch_state::FetchStateMachine,
    format,
    provider::MarketDataClient,
    providers::CoinGeckoClient,
    selection::SelectionController,
    transform::TimeSeriesTransformer,
    types::{
        Asset, ChartSeries, Concern, CurrencyCode, DashboardEvent, DashboardView, FetchOutcome,
        FetchState, Selection, SelectionChange, SnapshotEntry,
    },
};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};

/// Handle to a spawned fetch attempt
///
/// Dropping it does not cancel the request; superseded attempts always run to
/// completion and are discarded.
#[derive(Debug)]
pub struct FetchHandle {
    concern: Concern,
    generation: u64,
    handle: JoinHandle<FetchOutcome>,
}

impl FetchHandle {
    pub fn concern(&self) -> Concern {
        self.concern
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits for the attempt and reports whether its result was applied
    pub async fn outcome(self) -> Result<FetchOutcome, JoinError> {
        self.handle.await
    }
}

/// Handles for operations that refetch both concerns
#[derive(Debug)]
pub struct FetchHandles {
    pub snapshot: FetchHandle,
    pub history: FetchHandle,
}

struct Shared {
    client: Arc<dyn MarketDataClient>,
    catalog: AssetCatalog,
    transformer: TimeSeriesTransformer,
    config: DashboardConfig,
    selection: Mutex<SelectionController>,
    snapshot_generation: Mutex<u64>,
    snapshot: Arc<FetchStateMachine<Vec<SnapshotEntry>>>,
    history: Arc<FetchStateMachine<ChartSeries>>,
    filtered_assets: Mutex<Vec<Asset>>,
    view_tx: watch::Sender<DashboardView>,
    events: broadcast::Sender<DashboardEvent>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn build_view(&self) -> DashboardView {
        DashboardView {
            snapshot_state: self.snapshot.state(),
            history_state: self.history.state(),
            filtered_assets: lock(&self.filtered_assets).clone(),
            selection: lock(&self.selection).current().clone(),
        }
    }

    /// Re-publishes the view; never called while holding another lock
    fn publish(&self) {
        self.view_tx.send_modify(|view| *view = self.build_view());
    }

    /// Starts a history attempt for `change`; must run under the selection lock
    fn begin_history(
        &self,
        change: SelectionChange,
    ) -> impl Future<Output = FetchOutcome> + Send + 'static {
        let SelectionChange {
            selection,
            generation,
        } = change;

        let client = Arc::clone(&self.client);
        let transformer = self.transformer.clone();
        let days = self.config.history_days;
        let display_name = self
            .catalog
            .get(&selection.asset_id)
            .map(|a| a.display_name.clone())
            .unwrap_or_else(|| format::capitalize(&selection.asset_id));

        self.history.run(generation, async move {
            let points = client
                .fetch_history(&selection.asset_id, selection.currency, days)
                .await?;
            Ok::<_, ProviderError>(transformer.to_chart_series(
                &points,
                &display_name,
                selection.currency,
            ))
        })
    }

    /// Starts a snapshot attempt under a fresh snapshot generation
    fn begin_snapshot(
        &self,
        currency: CurrencyCode,
    ) -> (u64, impl Future<Output = FetchOutcome> + Send + 'static) {
        let client = Arc::clone(&self.client);
        let asset_ids = self.catalog.ids();

        let mut counter = lock(&self.snapshot_generation);
        *counter += 1;
        let generation = *counter;
        let fut = self.snapshot.run(generation, async move {
            client.fetch_snapshot(&asset_ids, currency).await
        });

        (generation, fut)
    }

    fn spawn<F>(self: &Arc<Self>, concern: Concern, generation: u64, fut: F) -> FetchHandle
    where
        F: Future<Output = FetchOutcome> + Send + 'static,
    {
        self.publish();

        let shared = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let outcome = fut.await;
            if outcome.is_applied() {
                shared.publish();
            }
            outcome
        });

        FetchHandle {
            concern,
            generation,
            handle,
        }
    }
}

/// Market data dashboard
///
/// All inbound calls are synchronous: they update the selection and move the
/// affected concern to `Loading` before returning, then fetch in a spawned task.
/// They must be called from within a tokio runtime.
///
/// # Example
/// ```no_run
/// use market_dashboard_sdk::{DashboardConfig, MarketDashboard};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dashboard = MarketDashboard::coingecko(DashboardConfig::from_env()?)?;
/// let mut views = dashboard.subscribe();
/// dashboard.start();
///
/// dashboard.select_asset("ethereum")?;
/// while views.changed().await.is_ok() {
///     let view = views.borrow_and_update().clone();
///     println!("history: {}", view.history_state.status());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MarketDashboard {
    shared: Arc<Shared>,
}

impl MarketDashboard {
    /// Creates a dashboard over the default catalog
    pub fn new(
        client: Arc<dyn MarketDataClient>,
        config: DashboardConfig,
    ) -> Result<Self, DashboardError> {
        Self::with_catalog(client, AssetCatalog::default(), config)
    }

    /// Creates a dashboard backed by CoinGecko
    pub fn coingecko(config: DashboardConfig) -> Result<Self, DashboardError> {
        let client = CoinGeckoClient::new(&config)
            .map_err(|e| DashboardError::ClientSetup(e.to_string()))?;
        Self::new(Arc::new(client), config)
    }

    /// Creates a dashboard over a custom catalog
    ///
    /// The configured default asset must be part of `catalog`, and the date
    /// label format must be one chrono understands.
    pub fn with_catalog(
        client: Arc<dyn MarketDataClient>,
        catalog: AssetCatalog,
        config: DashboardConfig,
    ) -> Result<Self, DashboardError> {
        let initial = config.default_selection.clone();
        if !catalog.contains(&initial.asset_id) {
            return Err(DashboardError::unknown_asset(&initial.asset_id));
        }
        let transformer = TimeSeriesTransformer::new(config.date_label_format.clone())?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let filtered = catalog.filter("");
        let (view_tx, _) = watch::channel(DashboardView {
            snapshot_state: FetchState::Idle,
            history_state: FetchState::Idle,
            filtered_assets: filtered.clone(),
            selection: initial.clone(),
        });

        let shared = Shared {
            client,
            transformer,
            selection: Mutex::new(SelectionController::new(initial, events.clone())),
            snapshot_generation: Mutex::new(0),
            snapshot: Arc::new(FetchStateMachine::new(Concern::Snapshot, events.clone())),
            history: Arc::new(FetchStateMachine::new(Concern::History, events.clone())),
            filtered_assets: Mutex::new(filtered),
            view_tx,
            events,
            catalog,
            config,
        };

        Ok(Self {
            shared: Arc::new(shared),
        })
    }

    /// Issues the initial snapshot and history fetches
    pub fn start(&self) -> FetchHandles {
        tracing::info!(
            provider = self.provider_name(),
            assets = self.shared.catalog.len(),
            "Starting market dashboard"
        );

        FetchHandles {
            snapshot: self.reload_snapshot(),
            history: self.reload_history(),
        }
    }

    /// Selects `asset_id`, keeping the currency, and refetches its history
    pub fn select_asset(&self, asset_id: &str) -> Result<FetchHandle, DashboardError> {
        if !self.shared.catalog.contains(asset_id) {
            tracing::warn!(asset_id, "Rejecting selection of unknown asset");
            return Err(DashboardError::unknown_asset(asset_id));
        }

        let (generation, fut) = {
            let mut selection = lock(&self.shared.selection);
            let change = selection.select_asset(asset_id);
            (change.generation, self.shared.begin_history(change))
        };

        Ok(self.shared.spawn(Concern::History, generation, fut))
    }

    /// Switches the currency and refetches both history and snapshot in it
    pub fn change_currency(&self, currency: CurrencyCode) -> FetchHandles {
        let (generation, fut) = {
            let mut selection = lock(&self.shared.selection);
            let change = selection.change_currency(currency);
            (change.generation, self.shared.begin_history(change))
        };
        let history = self.shared.spawn(Concern::History, generation, fut);

        let (generation, fut) = self.shared.begin_snapshot(currency);
        let snapshot = self.shared.spawn(Concern::Snapshot, generation, fut);

        FetchHandles { snapshot, history }
    }

    /// Filters the asset selector and publishes the result
    pub fn search(&self, query: &str) -> Vec<Asset> {
        let filtered = self.shared.catalog.filter(query);
        *lock(&self.shared.filtered_assets) = filtered.clone();
        self.shared.publish();
        filtered
    }

    /// Refetches the snapshot in the current currency
    pub fn reload_snapshot(&self) -> FetchHandle {
        let currency = lock(&self.shared.selection).current().currency;
        let (generation, fut) = self.shared.begin_snapshot(currency);
        self.shared.spawn(Concern::Snapshot, generation, fut)
    }

    /// Re-selects the current selection, refetching its history
    pub fn reload_history(&self) -> FetchHandle {
        let (generation, fut) = {
            let mut selection = lock(&self.shared.selection);
            let current = selection.current().clone();
            let change = selection.select(current.asset_id, current.currency);
            (change.generation, self.shared.begin_history(change))
        };

        self.shared.spawn(Concern::History, generation, fut)
    }

    /// Spawns the periodic snapshot refresh, if an interval is configured
    ///
    /// The first refresh happens one interval after the call; `start` covers
    /// the initial fetch.
    pub fn spawn_snapshot_refresh(&self) -> Option<JoinHandle<()>> {
        let period = self.shared.config.snapshot_refresh_interval?;
        let dashboard = self.clone();

        Some(tokio::spawn(async move {
            tracing::info!(
                refresh_interval_secs = period.as_secs(),
                "Starting snapshot refresh task"
            );

            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match dashboard.reload_snapshot().outcome().await {
                    Ok(FetchOutcome::Applied) => {}
                    Ok(FetchOutcome::StaleResultDiscarded { .. }) => {
                        tracing::debug!("Periodic snapshot superseded by a newer reload");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Snapshot refresh task panicked");
                    }
                }
            }
        }))
    }

    /// Latest published view
    pub fn view(&self) -> DashboardView {
        self.shared.view_tx.borrow().clone()
    }

    /// Receiver notified after every state transition
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.shared.view_tx.subscribe()
    }

    /// Stream of selection and fetch events
    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.shared.events.subscribe()
    }

    pub fn selection(&self) -> Selection {
        lock(&self.shared.selection).current().clone()
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.shared.catalog
    }

    /// Returns the name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.shared.client.provider_name()
    }
}
