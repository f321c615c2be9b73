//! Selection state
//!
//! The set of seasons currently switched on in the toolbar. Owned by the
//! controller; mutations report whether anything changed so the controller
//! can recompute exactly once per effective change.

use crate::error::DashboardError;
use crate::season::SeasonTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of active seasons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    active: BTreeSet<SeasonTag>,
}

impl Default for SelectionState {
    /// All four seasons active
    fn default() -> Self {
        Self::all()
    }
}

impl SelectionState {
    /// Every season active
    pub fn all() -> Self {
        Self {
            active: SeasonTag::ALL.into_iter().collect(),
        }
    }

    /// No season active
    pub fn none() -> Self {
        Self {
            active: BTreeSet::new(),
        }
    }

    /// Build from an explicit set of seasons
    pub fn from_seasons(seasons: impl IntoIterator<Item = SeasonTag>) -> Self {
        Self {
            active: seasons.into_iter().collect(),
        }
    }

    /// Build from season names, rejecting the first unknown name
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, DashboardError> {
        let seasons = names
            .iter()
            .map(|n| n.as_ref().parse::<SeasonTag>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { active: seasons })
    }

    /// Whether a season is switched on
    pub fn contains(&self, season: SeasonTag) -> bool {
        self.active.contains(&season)
    }

    /// Flip membership of one season. Always a change.
    pub fn toggle(&mut self, season: SeasonTag) {
        if !self.active.remove(&season) {
            self.active.insert(season);
        }
    }

    /// Switch a single season on or off. Returns whether the set changed.
    pub fn set(&mut self, season: SeasonTag, present: bool) -> bool {
        if present {
            self.active.insert(season)
        } else {
            self.active.remove(&season)
        }
    }

    /// Select or clear all seasons at once. Returns whether the set changed.
    pub fn set_all(&mut self, present: bool) -> bool {
        let target = if present { Self::all() } else { Self::none() };
        if *self == target {
            return false;
        }
        *self = target;
        true
    }

    /// Replace the whole selection. Returns whether the set changed.
    pub fn replace(&mut self, other: SelectionState) -> bool {
        if *self == other {
            return false;
        }
        *self = other;
        true
    }

    /// Active seasons in canonical order
    pub fn active(&self) -> Vec<SeasonTag> {
        self.active.iter().copied().collect()
    }

    /// Number of active seasons
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// True when every season is off
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Membership as a canonical-order bitmap
    pub fn mask(&self) -> [bool; 4] {
        SeasonTag::ALL.map(|tag| self.active.contains(&tag))
    }

    /// Load a persisted selection
    pub fn from_json(json: &str) -> Result<Self, DashboardError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize for host-side persistence
    pub fn to_json(&self) -> Result<String, DashboardError> {
        Ok(serde_json::to_string(self)?)
    }
}
