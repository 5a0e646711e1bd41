//! Client abstraction for fetching market data from an external provider

use crate::{
    error::ProviderError,
    types::{CurrencyCode, PricePoint, SnapshotEntry},
};
use async_trait::async_trait;

/// Trait for market data clients
///
/// Implementations perform exactly one request per call and never retry;
/// retrying is left to whoever triggered the fetch.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Fetches current price and 24h change for a set of assets
    ///
    /// # Arguments
    /// * `asset_ids` - Canonical ids of the assets to fetch
    /// * `currency` - Currency the prices are quoted in
    ///
    /// # Returns
    /// One entry per asset the provider knows about, in request order
    async fn fetch_snapshot(
        &self,
        asset_ids: &[String],
        currency: CurrencyCode,
    ) -> Result<Vec<SnapshotEntry>, ProviderError>;

    /// Fetches the price history of one asset over the last `days` days
    ///
    /// # Returns
    /// Price points ordered by ascending timestamp
    async fn fetch_history(
        &self,
        asset_id: &str,
        currency: CurrencyCode,
        days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError>;

    /// Returns the name of this client's provider
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Reply<T> = Result<T, ProviderError>;

    /// A scripted reply: available immediately or released later by the test
    enum Scripted<T> {
        Ready(Reply<T>),
        Held(oneshot::Receiver<Reply<T>>),
    }

    impl<T> Scripted<T> {
        async fn resolve(self) -> Reply<T> {
            match self {
                Scripted::Ready(reply) => reply,
                Scripted::Held(rx) => rx.await.unwrap_or_else(|_| {
                    Err(ProviderError::InvalidRequest(
                        "held mock reply was dropped".to_string(),
                    ))
                }),
            }
        }
    }

    /// Mock client replaying scripted replies in FIFO order
    #[derive(Default)]
    pub struct MockClient {
        snapshots: Mutex<VecDeque<Scripted<Vec<SnapshotEntry>>>>,
        histories: Mutex<HashMap<String, VecDeque<Scripted<Vec<PricePoint>>>>>,
        snapshot_calls: Mutex<Vec<(Vec<String>, CurrencyCode)>>,
        history_calls: Mutex<Vec<(String, CurrencyCode, u32)>>,
    }

    impl MockClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entry(asset_id: &str, current_price: f64, change_24h_percent: f64) -> SnapshotEntry {
            SnapshotEntry {
                asset_id: asset_id.to_string(),
                name: crate::format::capitalize(asset_id),
                current_price,
                change_24h_percent,
            }
        }

        pub fn push_snapshot(&self, reply: Reply<Vec<SnapshotEntry>>) {
            self.snapshots
                .lock()
                .unwrap()
                .push_back(Scripted::Ready(reply));
        }

        /// Next snapshot call waits until the returned sender fires
        pub fn hold_snapshot(&self) -> oneshot::Sender<Reply<Vec<SnapshotEntry>>> {
            let (tx, rx) = oneshot::channel();
            self.snapshots.lock().unwrap().push_back(Scripted::Held(rx));
            tx
        }

        pub fn push_history(&self, asset_id: &str, reply: Reply<Vec<PricePoint>>) {
            self.histories
                .lock()
                .unwrap()
                .entry(asset_id.to_string())
                .or_default()
                .push_back(Scripted::Ready(reply));
        }

        /// Next history call for `asset_id` waits until the returned sender fires
        pub fn hold_history(&self, asset_id: &str) -> oneshot::Sender<Reply<Vec<PricePoint>>> {
            let (tx, rx) = oneshot::channel();
            self.histories
                .lock()
                .unwrap()
                .entry(asset_id.to_string())
                .or_default()
                .push_back(Scripted::Held(rx));
            tx
        }

        pub fn snapshot_calls(&self) -> Vec<(Vec<String>, CurrencyCode)> {
            self.snapshot_calls.lock().unwrap().clone()
        }

        pub fn history_calls(&self) -> Vec<(String, CurrencyCode, u32)> {
            self.history_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MarketDataClient for MockClient {
        async fn fetch_snapshot(
            &self,
            asset_ids: &[String],
            currency: CurrencyCode,
        ) -> Result<Vec<SnapshotEntry>, ProviderError> {
            self.snapshot_calls
                .lock()
                .unwrap()
                .push((asset_ids.to_vec(), currency));
            let scripted = self.snapshots.lock().unwrap().pop_front();
            match scripted {
                Some(scripted) => scripted.resolve().await,
                None => Err(ProviderError::api(404, "no scripted snapshot")),
            }
        }

        async fn fetch_history(
            &self,
            asset_id: &str,
            currency: CurrencyCode,
            days: u32,
        ) -> Result<Vec<PricePoint>, ProviderError> {
            self.history_calls
                .lock()
                .unwrap()
                .push((asset_id.to_string(), currency, days));
            let scripted = self
                .histories
                .lock()
                .unwrap()
                .get_mut(asset_id)
                .and_then(|queue| queue.pop_front());
            match scripted {
                Some(scripted) => scripted.resolve().await,
                None => Err(ProviderError::api(
                    404,
                    format!("no scripted history for {}", asset_id),
                )),
            }
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
