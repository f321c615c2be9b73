//! Aggregation engine
//!
//! Computes per-season and overall KPIs in a single pass over a filtered
//! series:
//! - count, sum and mean (0 when empty)
//! - min and max (None when empty; ties keep the first value seen)
//! - trend delta: last value minus first value in timestamp order

use crate::season::SeasonTag;
use crate::types::{DataPoint, Kpi};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// KPI results for one filtered series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    /// All four seasons, zeroed when absent
    pub by_season: BTreeMap<SeasonTag, Kpi>,
    pub overall: Kpi,
}

impl Aggregates {
    /// Zeroed KPIs for every season and overall
    pub fn empty() -> Self {
        Self {
            by_season: SeasonTag::ALL.into_iter().map(|s| (s, Kpi::EMPTY)).collect(),
            overall: Kpi::EMPTY,
        }
    }
}

/// Running statistics over a stream of values
#[derive(Debug, Clone, Copy, Default)]
struct KpiAccumulator {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
    first: Option<f64>,
    last: Option<f64>,
}

impl KpiAccumulator {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        if self.min.map_or(true, |m| value < m) {
            self.min = Some(value);
        }
        if self.max.map_or(true, |m| value > m) {
            self.max = Some(value);
        }
        if self.first.is_none() {
            self.first = Some(value);
        }
        self.last = Some(value);
    }

    fn finish(self) -> Kpi {
        if self.count == 0 {
            return Kpi::EMPTY;
        }
        Kpi {
            count: self.count,
            sum: self.sum,
            mean: self.sum / self.count as f64,
            min: self.min,
            max: self.max,
            trend: match (self.first, self.last) {
                (Some(first), Some(last)) => Some(last - first),
                _ => None,
            },
        }
    }
}

/// KPI calculator
pub struct AggregationEngine;

impl AggregationEngine {
    /// Aggregate a filtered, timestamp-ordered series
    pub fn aggregate(series: &[DataPoint]) -> Aggregates {
        Self::aggregate_cancellable(series, usize::MAX, || false).unwrap_or_else(Aggregates::empty)
    }

    /// Cancellable variant; returns None as soon as `cancelled` reports true.
    ///
    /// `cancelled` is polled once every `check_interval` points.
    pub fn aggregate_cancellable<F>(
        series: &[DataPoint],
        check_interval: usize,
        cancelled: F,
    ) -> Option<Aggregates>
    where
        F: Fn() -> bool,
    {
        let interval = check_interval.max(1);
        let mut per_season = [KpiAccumulator::default(); 4];
        let mut overall = KpiAccumulator::default();

        for (i, point) in series.iter().enumerate() {
            if i % interval == 0 && i > 0 && cancelled() {
                return None;
            }
            per_season[point.season.index()].push(point.value);
            overall.push(point.value);
        }

        Some(Aggregates {
            by_season: SeasonTag::ALL
                .into_iter()
                .map(|s| (s, per_season[s.index()].finish()))
                .collect(),
            overall: overall.finish(),
        })
    }
}
