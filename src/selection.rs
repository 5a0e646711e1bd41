//! Selected asset/currency with a generation counter

use crate::types::{CurrencyCode, DashboardEvent, Selection, SelectionChange};
use tokio::sync::broadcast;

/// Owns the current selection
///
/// Every call to [`SelectionController::select`] bumps the generation, even when
/// the new selection equals the old one; fetches tagged with an older
/// generation are stale.
pub struct SelectionController {
    current: Selection,
    generation: u64,
    events: broadcast::Sender<DashboardEvent>,
}

impl SelectionController {
    /// Creates a controller at generation 0 holding `initial`
    pub fn new(initial: Selection, events: broadcast::Sender<DashboardEvent>) -> Self {
        Self {
            current: initial,
            generation: 0,
            events,
        }
    }

    /// Replaces the selection and emits `SelectionChanged`
    pub fn select(
        &mut self,
        asset_id: impl Into<String>,
        currency: CurrencyCode,
    ) -> SelectionChange {
        self.current = Selection::new(asset_id, currency);
        self.generation += 1;

        let change = SelectionChange {
            selection: self.current.clone(),
            generation: self.generation,
        };

        tracing::debug!(
            asset_id = %change.selection.asset_id,
            currency = change.selection.currency.code(),
            generation = change.generation,
            "Selection changed"
        );

        // No subscribers is fine
        let _ = self.events.send(DashboardEvent::selection_changed(&change));

        change
    }

    /// Selects another asset, keeping the currency
    pub fn select_asset(&mut self, asset_id: impl Into<String>) -> SelectionChange {
        let currency = self.current.currency;
        self.select(asset_id, currency)
    }

    /// Switches the currency, keeping the asset
    pub fn change_currency(&mut self, currency: CurrencyCode) -> SelectionChange {
        let asset_id = self.current.asset_id.clone();
        self.select(asset_id, currency)
    }

    pub fn current(&self) -> &Selection {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> (SelectionController, broadcast::Receiver<DashboardEvent>) {
        let (tx, rx) = broadcast::channel(16);
        let controller = SelectionController::new(Selection::new("bitcoin", CurrencyCode::Usd), tx);
        (controller, rx)
    }

    #[test]
    fn test_initial_selection() {
        let (controller, _rx) = controller();
        assert_eq!(controller.current(), &Selection::new("bitcoin", CurrencyCode::Usd));
        assert_eq!(controller.generation(), 0);
    }

    #[test]
    fn test_generation_increments_on_every_call() {
        let (mut controller, _rx) = controller();
        assert_eq!(controller.select("ethereum", CurrencyCode::Usd).generation, 1);
        assert_eq!(controller.select("ethereum", CurrencyCode::Usd).generation, 2);
        assert_eq!(controller.select_asset("ripple").generation, 3);
        assert_eq!(controller.generation(), 3);
    }

    #[test]
    fn test_partial_updates_keep_other_half() {
        let (mut controller, _rx) = controller();
        controller.select_asset("litecoin");
        let change = controller.change_currency(CurrencyCode::Gbp);
        assert_eq!(change.selection, Selection::new("litecoin", CurrencyCode::Gbp));
    }

    #[test]
    fn test_emits_selection_changed() {
        let (mut controller, mut rx) = controller();
        controller.select("ethereum", CurrencyCode::Eur);

        match rx.try_recv().unwrap() {
            DashboardEvent::SelectionChanged {
                selection,
                generation,
                ..
            } => {
                assert_eq!(selection, Selection::new("ethereum", CurrencyCode::Eur));
                assert_eq!(generation, 1);
            }
            other => panic!("unexpected event: {}", other),
        }
    }
}
