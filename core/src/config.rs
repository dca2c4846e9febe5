use serde::{Deserialize, Serialize};

use crate::store::normalize_label;

/// Names of the source columns holding each semantic field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub analysis_count:    String,
    pub target_population: String,
    pub city:              String,
    pub partner:           String,
    pub region:            String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            analysis_count:    "analysis_count".into(),
            target_population: "target_population".into(),
            city:              "city".into(),
            partner:           "partner".into(),
            region:            "region".into(),
        }
    }
}

impl ColumnMap {
    /// The five required labels, normalized the same way loaded labels are.
    pub fn required(&self) -> [String; 5] {
        [
            normalize_label(&self.analysis_count),
            normalize_label(&self.target_population),
            normalize_label(&self.city),
            normalize_label(&self.partner),
            normalize_label(&self.region),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// SQLite database path or `file:` URI.
    pub database: String,
    pub table:    String,
    /// Theme preset name, see `Theme::by_name`.
    pub theme:    String,
    pub columns:  ColumnMap,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            database: "dashboard.db".into(),
            table:    "coverage".into(),
            theme:    "compact".into(),
            columns:  ColumnMap::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DashboardConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }
}
