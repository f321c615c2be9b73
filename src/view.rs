//! View model assembly
//!
//! Runs filter then aggregate and packages the result as one immutable
//! snapshot, so renderers never see a series and KPIs from different
//! selections.

use crate::aggregate::{AggregationEngine, Aggregates};
use crate::filter::FilterEngine;
use crate::season::SeasonTag;
use crate::selection::SelectionState;
use crate::store::SeriesStore;
use crate::types::{DataPoint, LegendEntry, ViewModel};
use chrono::Utc;

/// Builder for view model snapshots
pub struct ViewBuilder;

impl ViewBuilder {
    /// Full recomputation for one selection
    pub fn build(store: &SeriesStore, selection: &SelectionState, revision: u64) -> ViewModel {
        let filtered = FilterEngine::filter(store, selection);
        let aggregates = AggregationEngine::aggregate(&filtered);
        Self::assemble(filtered, aggregates, selection, revision)
    }

    /// Recomputation that gives up once `cancelled` reports true
    pub fn build_cancellable<F>(
        store: &SeriesStore,
        selection: &SelectionState,
        revision: u64,
        check_interval: usize,
        cancelled: F,
    ) -> Option<ViewModel>
    where
        F: Fn() -> bool,
    {
        let filtered = FilterEngine::filter_cancellable(store, selection, check_interval, &cancelled)?;
        let aggregates =
            AggregationEngine::aggregate_cancellable(&filtered, check_interval, &cancelled)?;
        Some(Self::assemble(filtered, aggregates, selection, revision))
    }

    fn assemble(
        filtered: Vec<DataPoint>,
        aggregates: Aggregates,
        selection: &SelectionState,
        revision: u64,
    ) -> ViewModel {
        ViewModel {
            revision,
            computed_at: Utc::now(),
            filtered_series: filtered,
            kpis_by_season: aggregates.by_season,
            kpis_overall: aggregates.overall,
            active_seasons: selection.active(),
            legend: legend(selection),
        }
    }
}

/// Legend rows for all four seasons in canonical order
pub fn legend(selection: &SelectionState) -> Vec<LegendEntry> {
    SeasonTag::ALL
        .into_iter()
        .map(|season| LegendEntry {
            season,
            label: season.label().to_string(),
            color: season.color().to_string(),
            active: selection.contains(season),
        })
        .collect()
}
