//! Series store
//!
//! The ground-truth dataset: validated once at load, sorted ascending by
//! timestamp, and never mutated afterwards. A reload builds a new store.

use crate::error::DashboardError;
use crate::season::SeasonTag;
use crate::types::{DataPoint, RawPoint, Timestamp};
use tracing::{debug, warn};

/// Immutable, timestamp-ordered collection of data points
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStore {
    points: Vec<DataPoint>,
}

impl SeriesStore {
    /// Validate and sort raw records into a store.
    ///
    /// Every invalid record is reported, not just the first. Any failure is
    /// returned as a single `LoadFailed` carrying all causes.
    pub fn load(raw_points: &[RawPoint]) -> Result<Self, DashboardError> {
        Self::collect(raw_points.iter().map(Ok), raw_points.len())
    }

    /// Like `load`, for records that may already have failed to decode.
    ///
    /// A decode failure is reported as `InvalidDataPoint` at its index
    /// alongside every other invalid record.
    pub fn load_records(records: &[Result<RawPoint, String>]) -> Result<Self, DashboardError> {
        Self::collect(
            records.iter().map(|r| r.as_ref().map_err(String::as_str)),
            records.len(),
        )
    }

    /// Load from a JSON array of raw records.
    ///
    /// Input that is not a JSON array is reported as `LoadFailed` with a
    /// single `JsonError` cause.
    pub fn from_json(json: &str) -> Result<Self, DashboardError> {
        let records = RawPoint::parse_array(json)
            .map_err(|e| DashboardError::LoadFailed { causes: vec![e] })?;
        Self::load_records(&records)
    }

    fn collect<'a, I>(records: I, total: usize) -> Result<Self, DashboardError>
    where
        I: Iterator<Item = Result<&'a RawPoint, &'a str>>,
    {
        let mut causes = Vec::new();
        let mut points = Vec::with_capacity(total);
        let mut dataset_kind: Option<&'static str> = None;

        for (index, record) in records.enumerate() {
            let validated = match record {
                Ok(raw) => validate_point(index, raw, &mut dataset_kind),
                Err(reason) => Err(DashboardError::InvalidDataPoint {
                    index,
                    reason: reason.to_string(),
                }),
            };
            match validated {
                Ok(point) => points.push(point),
                Err(e) => causes.push(e),
            }
        }

        if causes.is_empty() && points.is_empty() {
            causes.push(DashboardError::EmptyDataset);
        }

        if !causes.is_empty() {
            warn!(records = total, errors = causes.len(), "rejected dataset");
            return Err(DashboardError::LoadFailed { causes });
        }

        // Stable: ties keep input order
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        debug!(points = points.len(), "loaded series store");

        Ok(Self { points })
    }

    /// Points in ascending timestamp order
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    /// Iterate points in ascending timestamp order
    pub fn iter(&self) -> impl Iterator<Item = &DataPoint> {
        self.points.iter()
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a loaded store
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Earliest and latest timestamps
    pub fn span(&self) -> Option<(Timestamp, Timestamp)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Number of points per season, in canonical order
    pub fn season_counts(&self) -> [(SeasonTag, usize); 4] {
        let mut counts = [0usize; 4];
        for point in &self.points {
            counts[point.season.index()] += 1;
        }
        SeasonTag::ALL.map(|tag| (tag, counts[tag.index()]))
    }
}

fn validate_point(
    index: usize,
    raw: &RawPoint,
    dataset_kind: &mut Option<&'static str>,
) -> Result<DataPoint, DashboardError> {
    let invalid = |reason: String| DashboardError::InvalidDataPoint { index, reason };

    let season: SeasonTag = raw
        .season
        .parse()
        .map_err(|_| invalid(format!("unknown season {:?}", raw.season)))?;

    if !raw.value.is_finite() {
        return Err(invalid(format!("value {} is not finite", raw.value)));
    }

    let timestamp = Timestamp::parse(&raw.timestamp).map_err(invalid)?;

    let kind = timestamp.kind();
    match *dataset_kind {
        Some(expected) if expected != kind => {
            return Err(invalid(format!("{kind} timestamp in a {expected} dataset")));
        }
        Some(_) => {}
        None => *dataset_kind = Some(kind),
    }

    Ok(DataPoint {
        timestamp,
        season,
        value: raw.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_sorts_by_timestamp() {
        let raw = vec![
            RawPoint::new(3u64, "spring", 30.0),
            RawPoint::new(1u64, "summer", 10.0),
            RawPoint::new(2u64, "winter", 20.0),
        ];
        let store = SeriesStore::load(&raw).unwrap();
        let values: Vec<f64> = store.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 20.0, 30.0]);
        assert_eq!(
            store.span(),
            Some((Timestamp::Sequence(1), Timestamp::Sequence(3)))
        );
    }

    #[test]
    fn test_load_ties_keep_input_order() {
        let raw = vec![
            RawPoint::new(5u64, "autumn", 1.0),
            RawPoint::new(5u64, "spring", 2.0),
            RawPoint::new(1u64, "winter", 0.0),
            RawPoint::new(5u64, "summer", 3.0),
        ];
        let store = SeriesStore::load(&raw).unwrap();
        let values: Vec<f64> = store.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let raw = vec![
            RawPoint::new(1u64, "spring", 1.0),
            RawPoint::new(2u64, "spring", f64::NAN),
            RawPoint::new(3u64, "summer", f64::INFINITY),
        ];
        let err = SeriesStore::load(&raw).unwrap_err();
        let causes = err.causes();
        assert_eq!(causes.len(), 2);
        assert!(matches!(causes[0], DashboardError::InvalidDataPoint { index: 1, .. }));
        assert!(matches!(causes[1], DashboardError::InvalidDataPoint { index: 2, .. }));
    }

    #[test]
    fn test_rejects_unknown_season() {
        let raw = vec![RawPoint::new(1u64, "monsoon", 1.0)];
        let err = SeriesStore::load(&raw).unwrap_err();
        assert!(matches!(
            err.causes()[0],
            DashboardError::InvalidDataPoint { index: 0, ref reason } if reason.contains("monsoon")
        ));
    }

    #[test]
    fn test_rejects_mixed_timestamp_kinds() {
        let raw = vec![
            RawPoint::new("2024-01-01", "winter", 1.0),
            RawPoint::new(2u64, "winter", 2.0),
        ];
        let err = SeriesStore::load(&raw).unwrap_err();
        assert_eq!(err.causes().len(), 1);
        assert!(matches!(err.causes()[0], DashboardError::InvalidDataPoint { index: 1, .. }));
    }

    #[test]
    fn test_empty_dataset() {
        let err = SeriesStore::load(&[]).unwrap_err();
        assert!(err.is_empty_dataset());
    }

    #[test]
    fn test_json_reports_every_malformed_record() {
        let err = SeriesStore::from_json(
            r#"[
                {"timestamp": 1, "season": "spring", "value": null},
                {"timestamp": 2, "season": "monsoon", "value": 1},
                {"timestamp": -1, "season": "summer", "value": 2},
                {"timestamp": 4, "season": "winter", "value": 1e999},
                {"timestamp": 5, "season": "winter", "value": 3}
            ]"#,
        )
        .unwrap_err();

        let indices: Vec<usize> = err
            .causes()
            .iter()
            .map(|c| match c {
                DashboardError::InvalidDataPoint { index, .. } => *index,
                other => panic!("expected InvalidDataPoint, got {other:?}"),
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_json_not_an_array() {
        let err = SeriesStore::from_json(r#"{"timestamp": 1}"#).unwrap_err();
        assert!(matches!(err, DashboardError::LoadFailed { .. }));
        assert!(matches!(err.causes(), [DashboardError::JsonError(_)]));
    }

    #[test]
    fn test_season_counts() {
        let store = SeriesStore::from_json(
            r#"[
                {"timestamp": 1, "season": "spring", "value": 1},
                {"timestamp": 2, "season": "spring", "value": 2},
                {"timestamp": 3, "season": "winter", "value": 3}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            store.season_counts(),
            [
                (SeasonTag::Spring, 2),
                (SeasonTag::Summer, 0),
                (SeasonTag::Autumn, 0),
                (SeasonTag::Winter, 1),
            ]
        );
    }
}
