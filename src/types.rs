//! Core types for the seasonal dashboard engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: raw input records, validated data points, KPI aggregates and the
//! view model snapshot handed to renderers.

use crate::error::DashboardError;
use crate::season::SeasonTag;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::BTreeMap;

/// Ordering key of a data point
///
/// A dataset uses a single kind throughout; the store rejects mixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Plain sequence index
    Sequence(u64),
    /// Calendar instant (UTC)
    At(DateTime<Utc>),
}

impl Timestamp {
    /// Name of the timestamp kind, used in mixed-kind diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Timestamp::Sequence(_) => "sequence",
            Timestamp::At(_) => "datetime",
        }
    }

    /// Resolve a raw timestamp into a comparable key
    pub fn parse(raw: &RawTimestamp) -> Result<Self, String> {
        match raw {
            RawTimestamp::Index(i) => Ok(Timestamp::Sequence(*i)),
            RawTimestamp::Text(text) => parse_datetime(text).map(Timestamp::At),
        }
    }
}

fn parse_datetime(text: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("unparseable timestamp {trimmed:?}"))
}

/// Timestamp as it appears in input: a sequence index or a date string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Index(u64),
    Text(String),
}

impl From<u64> for RawTimestamp {
    fn from(value: u64) -> Self {
        RawTimestamp::Index(value)
    }
}

impl From<&str> for RawTimestamp {
    fn from(value: &str) -> Self {
        RawTimestamp::Text(value.to_string())
    }
}

/// Unvalidated input record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub timestamp: RawTimestamp,
    /// Season name, resolved case-insensitively
    pub season: String,
    pub value: f64,
}

impl RawPoint {
    /// Build a record from its parts
    pub fn new(timestamp: impl Into<RawTimestamp>, season: &str, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            season: season.to_string(),
            value,
        }
    }

    /// Parse a JSON array of raw records, decoding each element on its own.
    ///
    /// Only input that is not a JSON array fails as a whole. A malformed
    /// element (missing field, `null` value, out-of-range number) becomes an
    /// `Err` with the decode reason at its index.
    pub fn parse_array(json: &str) -> Result<Vec<Result<RawPoint, String>>, DashboardError> {
        let elements: Vec<&RawValue> = serde_json::from_str(json)?;
        Ok(elements
            .into_iter()
            .map(|element| {
                serde_json::from_str::<RawPoint>(element.get())
                    .map_err(|e| format!("malformed record: {e}"))
            })
            .collect())
    }
}

/// Validated, immutable data point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: Timestamp,
    pub season: SeasonTag,
    /// Always finite
    pub value: f64,
}

/// Summary statistics over a set of values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub count: usize,
    pub sum: f64,
    /// 0 when count is 0
    pub mean: f64,
    /// None when count is 0
    pub min: Option<f64>,
    /// None when count is 0
    pub max: Option<f64>,
    /// Last value minus first value in timestamp order; None when count is 0
    pub trend: Option<f64>,
}

impl Kpi {
    /// Zeroed KPI for a season with no data
    pub const EMPTY: Kpi = Kpi {
        count: 0,
        sum: 0.0,
        mean: 0.0,
        min: None,
        max: None,
        trend: None,
    };

    /// True when no values were aggregated
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for Kpi {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// One legend row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub season: SeasonTag,
    pub label: String,
    pub color: String,
    pub active: bool,
}

/// Immutable snapshot published to renderers after every recomputation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    /// Strictly increasing per controller
    pub revision: u64,
    pub computed_at: DateTime<Utc>,
    pub filtered_series: Vec<DataPoint>,
    /// Always holds all four seasons
    pub kpis_by_season: BTreeMap<SeasonTag, Kpi>,
    pub kpis_overall: Kpi,
    /// Active seasons in canonical order
    pub active_seasons: Vec<SeasonTag>,
    /// All four seasons in canonical order
    pub legend: Vec<LegendEntry>,
}

impl ViewModel {
    /// KPI for one season (zeroed when the season has no data)
    pub fn kpi(&self, season: SeasonTag) -> &Kpi {
        self.kpis_by_season.get(&season).unwrap_or(&Kpi::EMPTY)
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String, DashboardError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, DashboardError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_timestamp_parse_variants() {
        let seq = Timestamp::parse(&RawTimestamp::Index(7)).unwrap();
        assert_eq!(seq, Timestamp::Sequence(7));

        let day = Timestamp::parse(&"2024-03-21".into()).unwrap();
        match day {
            Timestamp::At(dt) => {
                assert_eq!(dt.month(), 3);
                assert_eq!(dt.hour(), 0);
            }
            other => panic!("expected datetime, got {other:?}"),
        }

        let instant = Timestamp::parse(&"2024-06-21T12:30:00+02:00".into()).unwrap();
        match instant {
            Timestamp::At(dt) => assert_eq!(dt.hour(), 10),
            other => panic!("expected datetime, got {other:?}"),
        }

        assert!(Timestamp::parse(&"midsummer".into()).is_err());
    }

    #[test]
    fn test_timestamp_ordering() {
        let a = Timestamp::parse(&"2024-01-01".into()).unwrap();
        let b = Timestamp::parse(&"2024-01-02T00:00:00Z".into()).unwrap();
        assert!(a < b);
        assert!(Timestamp::Sequence(1) < Timestamp::Sequence(2));
    }

    #[test]
    fn test_raw_point_json() {
        let json = r#"[
            {"timestamp": 1, "season": "spring", "value": 10.0},
            {"timestamp": "2024-07-01", "season": "Summer", "value": 20}
        ]"#;
        let points: Vec<RawPoint> = RawPoint::parse_array(json)
            .unwrap()
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp, RawTimestamp::Index(1));
        assert_eq!(points[1].timestamp, RawTimestamp::Text("2024-07-01".into()));
        assert_eq!(points[1].value, 20.0);

        assert!(RawPoint::parse_array("not json").is_err());
        assert!(RawPoint::parse_array(r#"{"timestamp": 1}"#).is_err());
    }

    #[test]
    fn test_malformed_elements_decoded_independently() {
        let json = r#"[
            {"timestamp": -1, "season": "spring", "value": 1},
            {"timestamp": 2, "season": "summer", "value": null},
            {"timestamp": 3, "season": "autumn", "value": 1e999},
            {"timestamp": 4, "season": "winter"},
            {"timestamp": 5, "season": "winter", "value": 5}
        ]"#;
        let records = RawPoint::parse_array(json).unwrap();
        assert_eq!(records.len(), 5);
        assert!(records[..4].iter().all(|r| r.is_err()));
        assert_eq!(records[4], Ok(RawPoint::new(5u64, "winter", 5.0)));
    }

    #[test]
    fn test_empty_kpi_serializes_nulls() {
        let json = serde_json::to_value(Kpi::EMPTY).unwrap();
        assert_eq!(json["count"], 0);
        assert_eq!(json["mean"], 0.0);
        assert!(json["min"].is_null());
        assert!(json["max"].is_null());
    }
}
