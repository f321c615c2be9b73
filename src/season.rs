//! Season tags
//!
//! The closed four-valued enumeration that classifies data points and drives
//! toolbar, legend and KPI card layout. Declaration order is the canonical
//! left-to-right toolbar order.

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Season classification of a data point
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonTag {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl SeasonTag {
    /// All seasons in canonical order
    pub const ALL: [SeasonTag; 4] = [
        SeasonTag::Spring,
        SeasonTag::Summer,
        SeasonTag::Autumn,
        SeasonTag::Winter,
    ];

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonTag::Spring => "spring",
            SeasonTag::Summer => "summer",
            SeasonTag::Autumn => "autumn",
            SeasonTag::Winter => "winter",
        }
    }

    /// Human-readable label for legends and cards
    pub fn label(&self) -> &'static str {
        match self {
            SeasonTag::Spring => "Spring",
            SeasonTag::Summer => "Summer",
            SeasonTag::Autumn => "Autumn",
            SeasonTag::Winter => "Winter",
        }
    }

    /// Legend accent color (hex)
    pub fn color(&self) -> &'static str {
        match self {
            SeasonTag::Spring => "#66d36e",
            SeasonTag::Summer => "#ffd166",
            SeasonTag::Autumn => "#ff8a5b",
            SeasonTag::Winter => "#7aa2ff",
        }
    }

    /// Position in canonical order (0..4)
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SeasonTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeasonTag {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SeasonTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DashboardError::UnknownSeasonTag(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_canonical_order() {
        let mut shuffled = vec![
            SeasonTag::Winter,
            SeasonTag::Spring,
            SeasonTag::Autumn,
            SeasonTag::Summer,
        ];
        shuffled.sort();
        assert_eq!(shuffled, SeasonTag::ALL.to_vec());
        assert_eq!(SeasonTag::Autumn.index(), 2);
    }

    #[test]
    fn test_parse() {
        assert_eq!("spring".parse::<SeasonTag>().unwrap(), SeasonTag::Spring);
        assert_eq!(" Winter ".parse::<SeasonTag>().unwrap(), SeasonTag::Winter);
        assert_eq!("AUTUMN".parse::<SeasonTag>().unwrap(), SeasonTag::Autumn);

        let err = "fall".parse::<SeasonTag>().unwrap_err();
        assert!(matches!(err, DashboardError::UnknownSeasonTag(ref s) if s == "fall"));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SeasonTag::Summer).unwrap();
        assert_eq!(json, "\"summer\"");
        let tag: SeasonTag = serde_json::from_str("\"winter\"").unwrap();
        assert_eq!(tag, SeasonTag::Winter);
        assert!(serde_json::from_str::<SeasonTag>("\"monsoon\"").is_err());
    }

    #[test]
    fn test_colors_are_distinct() {
        let colors: HashSet<&str> = SeasonTag::ALL.iter().map(|s| s.color()).collect();
        assert_eq!(colors.len(), 4);
        assert_eq!(SeasonTag::Spring.color(), "#66d36e");
    }
}
