//! Loading/success/error coordination for one fetch concern
//!
//! Each attempt is tagged with a generation. Only the attempt whose generation
//! is still the concern's in-flight generation when it finishes may change the
//! state; anything older is dropped without a trace in the state.

use crate::{
    error::ProviderError,
    types::{Concern, DashboardEvent, FetchOutcome, FetchState},
};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

struct Inner<T> {
    state: FetchState<T>,
    in_flight: Option<u64>,
}

/// State machine for a single concern (snapshot or history)
pub struct FetchStateMachine<T> {
    concern: Concern,
    inner: Mutex<Inner<T>>,
    events: broadcast::Sender<DashboardEvent>,
}

impl<T> FetchStateMachine<T> {
    /// Creates an `Idle` machine for `concern`
    pub fn new(concern: Concern, events: broadcast::Sender<DashboardEvent>) -> Self {
        Self {
            concern,
            inner: Mutex::new(Inner {
                state: FetchState::Idle,
                in_flight: None,
            }),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // State is always left consistent, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn concern(&self) -> Concern {
        self.concern
    }

    /// Generation of the most recently started attempt
    pub fn in_flight_generation(&self) -> Option<u64> {
        self.lock().in_flight
    }

    /// Moves to `Loading` and makes `generation` the in-flight attempt
    ///
    /// Valid from any state; an unfinished older attempt becomes stale.
    pub fn begin(&self, generation: u64) {
        let mut inner = self.lock();
        if let Some(previous) = inner.in_flight {
            if previous != generation && inner.state.is_loading() {
                tracing::debug!(
                    concern = %self.concern,
                    previous,
                    generation,
                    "Superseding in-flight fetch"
                );
            }
        }
        inner.state = FetchState::Loading;
        inner.in_flight = Some(generation);
    }

    /// Applies the result of attempt `generation` if it is still current
    pub fn complete(&self, generation: u64, result: Result<T, ProviderError>) -> FetchOutcome {
        let mut inner = self.lock();

        let current = inner.in_flight.unwrap_or_default();
        if inner.in_flight != Some(generation) {
            tracing::debug!(
                concern = %self.concern,
                generation,
                current,
                "Discarding stale fetch result"
            );
            return FetchOutcome::StaleResultDiscarded {
                generation,
                current,
            };
        }

        let event = match result {
            Ok(value) => {
                tracing::debug!(concern = %self.concern, generation, "Fetch succeeded");
                inner.state = FetchState::Success(value);
                DashboardEvent::fetch_succeeded(self.concern, generation)
            }
            Err(e) => {
                tracing::warn!(concern = %self.concern, generation, error = %e, "Fetch failed");
                let message = e.to_string();
                inner.state = FetchState::Error(message.clone());
                DashboardEvent::fetch_failed(self.concern, generation, message)
            }
        };
        drop(inner);

        let _ = self.events.send(event);
        FetchOutcome::Applied
    }

    /// Starts attempt `generation` now and returns a future driving it to completion
    ///
    /// The transition to `Loading` happens before this returns, not when the
    /// future is first polled.
    pub fn run<F>(
        self: &Arc<Self>,
        generation: u64,
        operation: F,
    ) -> impl Future<Output = FetchOutcome> + Send + 'static
    where
        F: Future<Output = Result<T, ProviderError>> + Send + 'static,
        T: Send + 'static,
    {
        self.begin(generation);
        let machine = Arc::clone(self);
        async move {
            let result = operation.await;
            machine.complete(generation, result)
        }
    }
}

impl<T: Clone> FetchStateMachine<T> {
    /// Current state
    pub fn state(&self) -> FetchState<T> {
        self.lock().state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    fn machine() -> (Arc<FetchStateMachine<u32>>, broadcast::Receiver<DashboardEvent>) {
        let (tx, rx) = broadcast::channel(16);
        (Arc::new(FetchStateMachine::new(Concern::History, tx)), rx)
    }

    #[test]
    fn test_starts_idle() {
        let (machine, _rx) = machine();
        assert!(machine.state().is_idle());
        assert_eq!(machine.in_flight_generation(), None);
    }

    #[tokio::test]
    async fn test_run_is_loading_before_first_poll() {
        let (machine, _rx) = machine();
        let (tx, rx) = oneshot::channel::<Result<u32, ProviderError>>();

        let fut = machine.run(1, async move { rx.await.unwrap() });
        assert!(machine.state().is_loading());
        assert_eq!(machine.in_flight_generation(), Some(1));

        tx.send(Ok(42)).unwrap();
        assert_eq!(fut.await, FetchOutcome::Applied);
        assert_eq!(machine.state(), FetchState::Success(42));
    }

    #[tokio::test]
    async fn test_error_replaces_success_payload() {
        let (machine, mut rx) = machine();
        machine.run(1, async { Ok(7) }).await;
        assert_eq!(machine.state(), FetchState::Success(7));

        let outcome = machine
            .run(2, async { Err(ProviderError::api(500, "boom")) })
            .await;
        assert!(outcome.is_applied());
        assert_eq!(
            machine.state(),
            FetchState::Error("Provider API error: HTTP 500: boom".to_string())
        );
        assert!(machine.state().data().is_none());

        assert_eq!(rx.try_recv().unwrap().event_type(), "FETCH_SUCCEEDED");
        assert_eq!(rx.try_recv().unwrap().event_type(), "FETCH_FAILED");
    }

    #[tokio::test]
    async fn test_late_older_result_is_discarded() {
        let (machine, mut rx) = machine();
        let (tx_a, rx_a) = oneshot::channel::<Result<u32, ProviderError>>();
        let (tx_b, rx_b) = oneshot::channel::<Result<u32, ProviderError>>();

        let fut_a = machine.run(1, async move { rx_a.await.unwrap() });
        let fut_b = machine.run(2, async move { rx_b.await.unwrap() });

        tx_b.send(Ok(200)).unwrap();
        assert_eq!(fut_b.await, FetchOutcome::Applied);

        tx_a.send(Ok(100)).unwrap();
        assert_eq!(
            fut_a.await,
            FetchOutcome::StaleResultDiscarded {
                generation: 1,
                current: 2
            }
        );

        assert_eq!(machine.state(), FetchState::Success(200));
        assert_eq!(rx.try_recv().unwrap().event_type(), "FETCH_SUCCEEDED");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_error_does_not_clobber_loading() {
        let (machine, _rx) = machine();
        let (tx_a, rx_a) = oneshot::channel::<Result<u32, ProviderError>>();

        let fut_a = machine.run(1, async move { rx_a.await.unwrap() });
        machine.begin(2);

        tx_a.send(Err(ProviderError::RateLimitExceeded)).unwrap();
        assert!(!fut_a.await.is_applied());
        assert!(machine.state().is_loading());
    }

    #[tokio::test]
    async fn test_error_then_recovery() {
        let (machine, _rx) = machine();
        machine
            .run(1, async { Err(ProviderError::malformed("no prices")) })
            .await;
        assert!(machine.state().is_error());

        machine.run(2, async { Ok(5) }).await;
        assert_eq!(machine.state(), FetchState::Success(5));
        assert!(machine.state().error_message().is_none());
    }
}
