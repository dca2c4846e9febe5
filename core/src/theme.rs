//! Cosmetic presets. Nothing here affects the numbers on screen.

use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};

pub const BRAND_RED: &str = "#C3131F";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name:             String,
    /// Page background.
    pub page_background:  String,
    /// Plot and paper background of both charts.
    pub chart_background: String,
    /// Bar fill and line colour.
    pub trace_color:      String,
    pub font_color:       String,
    pub logo_src:         String,
    pub logo_height_px:   u32,
    /// Grid columns (of 12) taken by each metric card.
    pub card_width:       u8,
    /// Grid columns taken by the filter panel.
    pub filter_width:     u8,
}

impl Theme {
    /// Red canvas, black traces, small cards.
    pub fn compact() -> Self {
        Self {
            name:             "compact".into(),
            page_background:  BRAND_RED.into(),
            chart_background: BRAND_RED.into(),
            trace_color:      "black".into(),
            font_color:       "white".into(),
            logo_src:         "/assets/logo.png".into(),
            logo_height_px:   60,
            card_width:       3,
            filter_width:     3,
        }
    }

    /// Black canvas, red traces, wider cards.
    pub fn spacious() -> Self {
        Self {
            name:             "spacious".into(),
            page_background:  BRAND_RED.into(),
            chart_background: "black".into(),
            trace_color:      BRAND_RED.into(),
            font_color:       "white".into(),
            logo_src:         "/assets/logo.png".into(),
            logo_height_px:   80,
            card_width:       4,
            filter_width:     6,
        }
    }

    pub fn by_name(name: &str) -> DashResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "compact"  => Ok(Self::compact()),
            "spacious" => Ok(Self::spacious()),
            _ => Err(DashError::UnknownTheme { name: name.to_string() }),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::compact()
    }
}
