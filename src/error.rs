//! Error types for the seasonal dashboard engine

use thiserror::Error;

/// Errors raised while loading data or configuring the dashboard
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Unknown season tag: {0:?}")]
    UnknownSeasonTag(String),

    #[error("Invalid data point at index {index}: {reason}")]
    InvalidDataPoint { index: usize, reason: String },

    #[error("Dataset contains no data points")]
    EmptyDataset,

    #[error("Dataset load failed with {} error(s)", causes.len())]
    LoadFailed { causes: Vec<DashboardError> },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DashboardError {
    /// Underlying causes of a `LoadFailed`; empty for every other variant.
    pub fn causes(&self) -> &[DashboardError] {
        match self {
            DashboardError::LoadFailed { causes } => causes,
            _ => &[],
        }
    }

    /// True when a load failed only because there was nothing to load.
    ///
    /// Lets a UI render "no data" instead of "error".
    pub fn is_empty_dataset(&self) -> bool {
        match self {
            DashboardError::EmptyDataset => true,
            DashboardError::LoadFailed { causes } => {
                !causes.is_empty()
                    && causes
                        .iter()
                        .all(|c| matches!(c, DashboardError::EmptyDataset))
            }
            _ => false,
        }
    }
}
