//! Dashboard configuration

use crate::error::DashboardError;
use crate::season::SeasonTag;
use crate::selection::SelectionState;
use serde::{Deserialize, Serialize};

/// Default number of points processed between supersession checks
pub const DEFAULT_CANCEL_CHECK_INTERVAL: usize = 4096;

/// Controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Seasons active at startup
    pub initial_selection: Vec<SeasonTag>,
    /// Points processed between supersession checks (must be > 0)
    pub cancel_check_interval: usize,
    /// Publish a view model when a dataset loads successfully
    pub publish_on_load: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            initial_selection: SeasonTag::ALL.to_vec(),
            cancel_check_interval: DEFAULT_CANCEL_CHECK_INTERVAL,
            publish_on_load: true,
        }
    }
}

impl DashboardConfig {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, DashboardError> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.cancel_check_interval == 0 {
            return Err(DashboardError::InvalidConfig(
                "cancel_check_interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Selection a new controller starts from
    pub fn initial_selection(&self) -> SelectionState {
        SelectionState::from_seasons(self.initial_selection.iter().copied())
    }
}
