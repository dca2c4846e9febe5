//! Presentation layer: turns an `Aggregation` into render-ready values.
//!
//! `Dashboard::render` is the only entry point a UI shell needs. It keeps
//! no state between calls: every render recomputes from the base dataset.

use std::{fmt::Write as _, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    dataset::Dataset,
    engine::{aggregate, Aggregation, FilterSelection, GroupTotal},
    theme::Theme,
    types::Dimension,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub id:    String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub category: String,
    pub value:    f64,
    /// Text drawn next to the bar.
    pub label:    String,
}

/// Horizontal bar chart: categories on the y axis, values on the x axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title:         String,
    pub x_axis_title:  String,
    pub y_axis_title:  String,
    pub orientation:   String,
    pub text_position: String,
    pub marker_color:  String,
    pub background:    String,
    pub font_color:    String,
    pub bars:          Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub x: String,
    pub y: f64,
}

/// Line-with-markers chart connecting points in grouping order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    pub title:        String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub mode:         String,
    pub line_color:   String,
    pub background:   String,
    pub font_color:   String,
    pub points:       Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterControl {
    pub id:          String,
    pub label:       String,
    pub placeholder: String,
    pub multi:       bool,
    pub options:     Vec<FilterOption>,
    pub selected:    Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub metrics:        Vec<MetricCard>,
    pub city_chart:     BarChart,
    pub partner_chart:  LineChart,
    /// City, partner, region. The order the controls are laid out in.
    pub filters:        Vec<FilterControl>,
    pub theme:          Theme,
    pub total_rows:     usize,
    pub filtered_rows:  usize,
    pub data_as_of:     DateTime<Utc>,
}

/// `"10.00%"`.
pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}

/// Whole numbers print without decimals, anything else with two.
pub fn format_total(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

pub struct Dashboard {
    dataset: Arc<Dataset>,
    theme:   Theme,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>, theme: Theme) -> Self {
        Self { dataset, theme }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn render(&self, selection: &FilterSelection) -> ViewModel {
        let agg = aggregate(&self.dataset, selection);
        self.build_view(selection, agg)
    }

    fn build_view(&self, selection: &FilterSelection, agg: Aggregation) -> ViewModel {
        let metrics = vec![
            MetricCard {
                id:    "analysis-percentage".into(),
                label: "Analysis Percentage".into(),
                value: format_percentage(agg.percentage),
            },
            MetricCard {
                id:    "target-population".into(),
                label: "Target Population".into(),
                value: format_total(agg.target_population_total),
            },
            MetricCard {
                id:    "analysis-loads".into(),
                label: "Analysis Loads".into(),
                value: format_total(agg.analysis_total),
            },
        ];

        let filters = vec![
            filter_control(Dimension::City, "City", "Select a city", &agg.city_options, selection),
            filter_control(
                Dimension::Partner,
                "Partner",
                "Select a partner",
                &agg.partner_options,
                selection,
            ),
            filter_control(
                Dimension::Region,
                "Region",
                "Select a region",
                &agg.region_options,
                selection,
            ),
        ];

        ViewModel {
            metrics,
            city_chart: self.bar_chart(&agg.city_aggregation),
            partner_chart: self.line_chart(&agg.partner_aggregation),
            filters,
            theme: self.theme.clone(),
            total_rows: self.dataset.len(),
            filtered_rows: agg.filtered.len(),
            data_as_of: self.dataset.loaded_at(),
        }
    }

    fn bar_chart(&self, groups: &[GroupTotal]) -> BarChart {
        BarChart {
            title:         "Analysis by City".into(),
            x_axis_title:  "Analysis".into(),
            y_axis_title:  "City".into(),
            orientation:   "h".into(),
            text_position: "outside".into(),
            marker_color:  self.theme.trace_color.clone(),
            background:    self.theme.chart_background.clone(),
            font_color:    self.theme.font_color.clone(),
            bars: groups
                .iter()
                .map(|g| Bar {
                    category: g.key.clone(),
                    value:    g.total,
                    label:    format_total(g.total),
                })
                .collect(),
        }
    }

    fn line_chart(&self, groups: &[GroupTotal]) -> LineChart {
        LineChart {
            title:        "Analysis by Partner".into(),
            x_axis_title: "Partner".into(),
            y_axis_title: "Analysis Sum".into(),
            mode:         "lines+markers".into(),
            line_color:   self.theme.trace_color.clone(),
            background:   self.theme.chart_background.clone(),
            font_color:   self.theme.font_color.clone(),
            points: groups
                .iter()
                .map(|g| LinePoint { x: g.key.clone(), y: g.total })
                .collect(),
        }
    }
}

fn filter_control(
    dimension: Dimension,
    label: &str,
    placeholder: &str,
    options: &[String],
    selection: &FilterSelection,
) -> FilterControl {
    FilterControl {
        id:          format!("filter-{}", dimension.id()),
        label:       label.to_string(),
        placeholder: placeholder.to_string(),
        multi:       true,
        options: options
            .iter()
            .map(|o| FilterOption { label: o.clone(), value: o.clone() })
            .collect(),
        selected: selection.selected(dimension).to_vec(),
    }
}

const TEXT_BAR_WIDTH: f64 = 40.0;

impl ViewModel {
    pub fn metric(&self, id: &str) -> Option<&str> {
        self.metrics.iter().find(|m| m.id == id).map(|m| m.value.as_str())
    }

    pub fn filter(&self, dimension: Dimension) -> Option<&FilterControl> {
        let id = format!("filter-{}", dimension.id());
        self.filters.iter().find(|f| f.id == id)
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== DASHBOARD ({} of {} rows) ===", self.filtered_rows, self.total_rows);
        for m in &self.metrics {
            let _ = writeln!(out, "  {:<20} {}", m.label, m.value);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "--- {} ---", self.city_chart.title);
        if self.city_chart.bars.is_empty() {
            let _ = writeln!(out, "  (no data)");
        }
        let max = self
            .city_chart
            .bars
            .iter()
            .map(|b| b.value)
            .fold(0.0_f64, f64::max);
        for bar in &self.city_chart.bars {
            let len = if max > 0.0 {
                (bar.value.max(0.0) / max * TEXT_BAR_WIDTH).round() as usize
            } else {
                0
            };
            let _ = writeln!(out, "  {:<16} {} {}", bar.category, "#".repeat(len), bar.label);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "--- {} ---", self.partner_chart.title);
        if self.partner_chart.points.is_empty() {
            let _ = writeln!(out, "  (no data)");
        }
        for p in &self.partner_chart.points {
            let _ = writeln!(out, "  {:<16} {}", p.x, format_total(p.y));
        }
        out
    }
}
