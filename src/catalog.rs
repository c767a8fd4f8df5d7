//! Minimal TerriaJS init document around one translated resource.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::emitter::ResourceConfig;
use crate::error::SldError;
use crate::options::ResourceKind;

pub const INIT_VERSION: &str = "8.0.0";
const BASE_MAP_ID: &str = "basemap-positron";
const CACHE_DURATION: &str = "5m";

/// Camera rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraBounds {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl Default for CameraBounds {
    fn default() -> Self {
        Self {
            north: 20.0,
            east: -13.0,
            south: -60.0,
            west: -108.0,
        }
    }
}

impl CameraBounds {
    /// Bounding box of a GeoJSON `Polygon` (a dataset's `spatial` field).
    /// Anything unreadable yields the default view.
    pub fn from_spatial(spatial: &str) -> Self {
        Self::try_from_spatial(spatial).unwrap_or_default()
    }

    fn try_from_spatial(spatial: &str) -> Option<Self> {
        let geometry: Value = serde_json::from_str(spatial).ok()?;
        if geometry.get("type")?.as_str()? != "Polygon" {
            return None;
        }

        let ring = geometry.get("coordinates")?.get(0)?.as_array()?;
        let mut points = ring.iter().filter_map(|p| {
            let lon = p.get(0)?.as_f64()?;
            let lat = p.get(1)?.as_f64()?;
            Some((lon, lat))
        });

        let (lon, lat) = points.next()?;
        let init = Self {
            north: lat,
            east: lon,
            south: lat,
            west: lon,
        };
        Some(points.fold(init, |b, (lon, lat)| Self {
            north: b.north.max(lat),
            east: b.east.max(lon),
            south: b.south.min(lat),
            west: b.west.min(lon),
        }))
    }
}

/// `north,east,south,west`.
impl FromStr for CameraBounds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid bounds '{}': {}", s, e))?;

        match values.as_slice() {
            &[north, east, south, west] => Ok(Self {
                north,
                east,
                south,
                west,
            }),
            _ => Err(format!(
                "invalid bounds '{}': expected north,east,south,west",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub id: String,
    pub url: String,
    pub cache_duration: String,
    pub is_open_in_workbench: bool,
    #[serde(flatten)]
    pub style: Option<ResourceConfig>,
}

impl CatalogItem {
    pub fn new(name: &str, url: &str, kind: ResourceKind) -> Self {
        Self {
            name: name.to_string(),
            item_type: kind.terria_type().to_string(),
            id: name.to_string(),
            url: url.to_string(),
            cache_duration: CACHE_DURATION.to_string(),
            is_open_in_workbench: true,
            style: None,
        }
    }

    /// Item for a translated resource; the type follows the config's kind.
    pub fn with_style(name: &str, url: &str, style: ResourceConfig) -> Self {
        let kind = style.kind;
        Self {
            style: Some(style),
            ..Self::new(name, url, kind)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMaps {
    pub default_base_map_id: String,
    pub preview_base_map_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSource {
    pub catalog: Vec<CatalogItem>,
    pub home_camera: CameraBounds,
    pub initial_camera: CameraBounds,
    pub stratum: String,
    pub workbench: Vec<String>,
    pub viewer_mode: String,
    pub focus_workbench_items: bool,
    pub base_maps: BaseMaps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub version: String,
    pub init_sources: Vec<InitSource>,
}

impl CatalogDocument {
    /// One item, open in the workbench, camera on `bounds`.
    pub fn single(item: CatalogItem, bounds: CameraBounds) -> Self {
        let workbench = vec![item.id.clone()];
        Self {
            version: INIT_VERSION.to_string(),
            init_sources: vec![InitSource {
                catalog: vec![item],
                home_camera: bounds,
                initial_camera: bounds,
                stratum: "user".to_string(),
                workbench,
                viewer_mode: "3D".to_string(),
                focus_workbench_items: true,
                base_maps: BaseMaps {
                    default_base_map_id: BASE_MAP_ID.to_string(),
                    preview_base_map_id: BASE_MAP_ID.to_string(),
                },
            }],
        }
    }

    pub fn to_json(&self) -> Result<String, SldError> {
        serde_json::to_string(self).map_err(|e| {
            SldError::MalformedDocument(format!("JSON serialization failed: {}", e))
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, SldError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            SldError::MalformedDocument(format!("JSON serialization failed: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::{Legend, LegendItem};
    use serde_json::json;

    fn style(kind: ResourceKind) -> ResourceConfig {
        ResourceConfig {
            kind,
            legends: vec![Legend {
                title: "Legend".to_string(),
                items: vec![LegendItem {
                    title: "All".to_string(),
                    color: "#FF0000".to_string(),
                }],
            }],
            render_options: None,
            styles: Vec::new(),
            active_style: None,
            opacity: 0.8,
        }
    }

    #[test]
    fn test_bounds_from_polygon() {
        let spatial = r#"{"type":"Polygon","coordinates":[[[-70.5,-33.0],[-70.5,-30.0],[-68.0,-30.0],[-68.0,-33.0],[-70.5,-33.0]]]}"#;
        let bounds = CameraBounds::from_spatial(spatial);
        assert_eq!(
            bounds,
            CameraBounds {
                north: -30.0,
                east: -68.0,
                south: -33.0,
                west: -70.5
            }
        );
    }

    #[test]
    fn test_bounds_fallback() {
        assert_eq!(CameraBounds::from_spatial(""), CameraBounds::default());
        assert_eq!(
            CameraBounds::from_spatial(r#"{"type":"Point","coordinates":[1,2]}"#),
            CameraBounds::default()
        );
        assert_eq!(
            CameraBounds::from_spatial(r#"{"type":"Polygon","coordinates":[[]]}"#),
            CameraBounds::default()
        );
    }

    #[test]
    fn test_bounds_from_str() {
        assert_eq!(
            "10, 20, -10, -20".parse::<CameraBounds>(),
            Ok(CameraBounds {
                north: 10.0,
                east: 20.0,
                south: -10.0,
                west: -20.0
            })
        );
        assert!("1,2,3".parse::<CameraBounds>().is_err());
        assert!("a,b,c,d".parse::<CameraBounds>().is_err());
    }

    #[test]
    fn test_document_shape() {
        let item = CatalogItem::with_style("flood", "https://data.example/flood.tif", style(ResourceKind::Raster));
        let doc = CatalogDocument::single(item, CameraBounds::default());
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["version"], "8.0.0");
        let source = &value["initSources"][0];
        assert_eq!(source["workbench"], json!(["flood"]));
        assert_eq!(source["viewerMode"], "3D");
        assert_eq!(source["homeCamera"]["west"], -108.0);
        assert_eq!(source["baseMaps"]["defaultBaseMapId"], "basemap-positron");

        let item = &source["catalog"][0];
        assert_eq!(item["type"], "cog");
        assert_eq!(item["cacheDuration"], "5m");
        assert_eq!(item["isOpenInWorkbench"], true);
        assert_eq!(item["legends"][0]["items"][0]["color"], "#FF0000");
        assert_eq!(item["opacity"], 0.8);
        assert!(item.get("forceCesiumPrimitives").is_none());
        assert!(item.get("clampToGround").is_none());
    }

    #[test]
    fn test_item_without_style() {
        let item = CatalogItem::new("points", "https://data.example/p.csv", ResourceKind::Csv);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "csv");
        assert!(value.get("legends").is_none());
    }
}
