//! Filter engine
//!
//! Selects the points whose season is active, in store order.

use crate::selection::SelectionState;
use crate::store::SeriesStore;
use crate::types::DataPoint;

/// Pure filter over a series store
pub struct FilterEngine;

impl FilterEngine {
    /// Points whose season is selected, preserving timestamp order.
    ///
    /// An empty selection yields an empty series.
    pub fn filter(store: &SeriesStore, selection: &SelectionState) -> Vec<DataPoint> {
        if selection.is_empty() {
            return Vec::new();
        }
        let mask = selection.mask();
        store
            .iter()
            .filter(|p| mask[p.season.index()])
            .copied()
            .collect()
    }

    /// Cancellable variant; returns None as soon as `cancelled` reports true.
    ///
    /// `cancelled` is polled once every `check_interval` points.
    pub fn filter_cancellable<F>(
        store: &SeriesStore,
        selection: &SelectionState,
        check_interval: usize,
        cancelled: F,
    ) -> Option<Vec<DataPoint>>
    where
        F: Fn() -> bool,
    {
        let mask = selection.mask();
        let interval = check_interval.max(1);
        let mut filtered = Vec::new();

        for (i, point) in store.iter().enumerate() {
            if i % interval == 0 && cancelled() {
                return None;
            }
            if mask[point.season.index()] {
                filtered.push(*point);
            }
        }

        Some(filtered)
    }
}
