//! Shared primitive types used across the dashboard.

use serde::{Deserialize, Serialize};

/// One loaded row with the five semantic fields the dashboard reads.
///
/// Categories are `None` when the source cell was NULL. Such rows still
/// count toward the metric sums but never match a selection, are never
/// grouped and are never offered as a filter option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub analysis_count:    f64,
    pub target_population: f64,
    pub city:              Option<String>,
    pub partner:           Option<String>,
    pub region:            Option<String>,
}

impl Record {
    /// Convenience constructor for fully populated rows.
    pub fn new(
        region: &str,
        city: &str,
        partner: &str,
        analysis_count: f64,
        target_population: f64,
    ) -> Self {
        Self {
            analysis_count,
            target_population,
            city:    Some(city.to_string()),
            partner: Some(partner.to_string()),
            region:  Some(region.to_string()),
        }
    }

    pub fn value_of(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Region  => self.region.as_deref(),
            Dimension::City    => self.city.as_deref(),
            Dimension::Partner => self.partner.as_deref(),
        }
    }
}

/// The three categorical dimensions a user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Region,
    City,
    Partner,
}

impl Dimension {
    /// Order in which selections are applied. Region is the top-level dimension.
    pub const FILTER_ORDER: [Dimension; 3] = [Dimension::Region, Dimension::City, Dimension::Partner];

    pub fn id(&self) -> &'static str {
        match self {
            Dimension::Region  => "region",
            Dimension::City    => "city",
            Dimension::Partner => "partner",
        }
    }
}
