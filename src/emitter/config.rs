//! Serializable subset of the TerriaJS catalog-item traits.
//!
//! Only the fields the translator fills are modelled. Rendering-primitive
//! and ground-clamping switches have no field here and so can never appear
//! in the output.

use serde::Serialize;

use crate::options::ResourceKind;

/// Style configuration for one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    #[serde(skip)]
    pub kind: ResourceKind,
    pub legends: Vec<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_options: Option<RenderOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<TableStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_style: Option<String>,
    pub opacity: f64,
}

impl ResourceConfig {
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Compact JSON. Field order is fixed, so equal configs give equal bytes.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub items: Vec<LegendItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub title: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOptions {
    pub single: SingleBandOptions,
}

/// Single-band raster colormap: `[[value, "#RRGGBB"], ...]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleBandOptions {
    pub colors: Vec<(f64, String)>,
    pub use_real_value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStyle {
    pub id: String,
    pub title: String,
    pub color: TableColorStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    Bin,
    Enum,
    Continuous,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColorStyle {
    pub map_type: MapType,
    pub color_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_maximums: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_colors: Option<Vec<EnumColor>>,
    pub null_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumColor {
    pub value: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStyle {
    pub spread_start_time: bool,
    pub spread_finish_time: bool,
}
