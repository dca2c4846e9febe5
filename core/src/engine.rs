//! Filter-and-aggregate engine.
//!
//! RULES:
//!   - Pure: reads the base dataset, never mutates it.
//!   - Selections apply in order region → city → partner. An empty
//!     selection leaves its dimension unconstrained.
//!   - An empty result is a normal state, never an error.
//!   - Region options always come from the full dataset; city and partner
//!     options come from the filtered rows.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    dataset::Dataset,
    types::{Dimension, Record},
};

/// Values the user picked in each multi-select control. A missing key
/// and an explicit `null` both mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    #[serde(deserialize_with = "null_as_empty")]
    pub region:  Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub city:    Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub partner: Vec<String>,
}

/// Deserialize a cleared multi-select (`null`) as an empty selection.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl FilterSelection {
    pub fn selected(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Region  => &self.region,
            Dimension::City    => &self.city,
            Dimension::Partner => &self.partner,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty() && self.city.is_empty() && self.partner.is_empty()
    }

    /// True when `record` passes every non-empty selection.
    pub fn matches(&self, record: &Record) -> bool {
        Dimension::FILTER_ORDER
            .iter()
            .all(|&dim| admits(self.selected(dim), record.value_of(dim)))
    }
}

fn admits(selected: &[String], value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    match value {
        Some(v) => selected.iter().any(|s| s == v),
        None    => false,
    }
}

/// Sum of `analysis_count` for one category value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key:   String,
    pub total: f64,
}

/// Everything one render needs, computed from a single filter pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub filtered:                Vec<Record>,
    pub percentage:              f64,
    pub target_population_total: f64,
    pub analysis_total:          f64,
    pub city_aggregation:        Vec<GroupTotal>,
    pub partner_aggregation:     Vec<GroupTotal>,
    pub city_options:            Vec<String>,
    pub partner_options:         Vec<String>,
    pub region_options:          Vec<String>,
}

/// Apply the selections in region → city → partner order, each pass
/// copying the surviving rows.
pub fn filter_records(dataset: &Dataset, selection: &FilterSelection) -> Vec<Record> {
    if selection.is_empty() {
        return dataset.records().to_vec();
    }
    let mut rows: Vec<Record> = dataset.records().to_vec();
    for dim in Dimension::FILTER_ORDER {
        let selected = selection.selected(dim);
        if selected.is_empty() {
            continue;
        }
        rows.retain(|r| admits(selected, r.value_of(dim)));
    }
    rows
}

/// Sum `analysis_count` per key, ordered by key. Rows without a key are skipped.
pub fn group_sum<'a, F>(records: &'a [Record], key: F) -> Vec<GroupTotal>
where
    F: Fn(&'a Record) -> Option<&'a str>,
{
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        if let Some(k) = key(record) {
            *groups.entry(k).or_insert(0.0) += record.analysis_count;
        }
    }
    groups
        .into_iter()
        .map(|(key, total)| GroupTotal { key: key.to_string(), total })
        .collect()
}

/// Distinct non-null values in first-appearance order.
pub fn distinct_values<'a, F>(records: &'a [Record], key: F) -> Vec<String>
where
    F: Fn(&'a Record) -> Option<&'a str>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter_map(|r| key(r))
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// 100 × analysis / population, or 0 when nothing remains to divide.
pub fn coverage_percentage(analysis_total: f64, population_total: f64, row_count: usize) -> f64 {
    if row_count == 0 || population_total == 0.0 {
        return 0.0;
    }
    analysis_total / population_total * 100.0
}

pub fn aggregate(dataset: &Dataset, selection: &FilterSelection) -> Aggregation {
    let filtered = filter_records(dataset, selection);

    let analysis_total: f64 = filtered.iter().map(|r| r.analysis_count).sum();
    let target_population_total: f64 = filtered.iter().map(|r| r.target_population).sum();
    let percentage = coverage_percentage(analysis_total, target_population_total, filtered.len());

    let city_aggregation = group_sum(&filtered, |r| r.city.as_deref());
    let partner_aggregation = group_sum(&filtered, |r| r.partner.as_deref());
    let city_options = distinct_values(&filtered, |r| r.city.as_deref());
    let partner_options = distinct_values(&filtered, |r| r.partner.as_deref());
    let region_options = distinct_values(dataset.records(), |r| r.region.as_deref());

    log::debug!(
        "aggregate: selection sizes region={} city={} partner={} → {}/{} rows",
        selection.region.len(),
        selection.city.len(),
        selection.partner.len(),
        filtered.len(),
        dataset.len()
    );

    Aggregation {
        filtered,
        percentage,
        target_population_total,
        analysis_total,
        city_aggregation,
        partner_aggregation,
        city_options,
        partner_options,
        region_options,
    }
}
