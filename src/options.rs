use std::fmt;
use std::str::FromStr;

use crate::error::SldError;

/// Environment switch for translator diagnostics.
pub const DEBUG_ENV: &str = "TERRIA_DEBUG";

/// Target renderer of the emitted configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceKind {
    /// Cloud-Optimized GeoTIFF.
    Raster,
    /// Shapefile / polygon features.
    #[default]
    Vector,
    /// CSV with point coordinates.
    Csv,
}

impl ResourceKind {
    /// Map a CKAN resource format (`SHP`, `GeoTIFF`, `csv-geo-au`, ...) to a kind.
    pub fn from_format(format: &str) -> Result<Self, SldError> {
        let lower = format.trim().to_ascii_lowercase();
        match lower.as_str() {
            "shp" | "shapefile" => Ok(ResourceKind::Vector),
            "tif" | "tiff" | "geotiff" | "cog" => Ok(ResourceKind::Raster),
            "csv" => Ok(ResourceKind::Csv),
            other if other.starts_with("csv-geo-") => Ok(ResourceKind::Csv),
            _ => Err(SldError::UnsupportedResourceKind(format.trim().to_string())),
        }
    }

    /// TerriaJS catalog item type.
    pub fn terria_type(&self) -> &'static str {
        match self {
            ResourceKind::Raster => "cog",
            ResourceKind::Vector => "shp",
            ResourceKind::Csv => "csv",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = SldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raster" => Ok(ResourceKind::Raster),
            "vector" => Ok(ResourceKind::Vector),
            "csv" => Ok(ResourceKind::Csv),
            _ => Err(SldError::UnsupportedResourceKind(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Raster => "raster",
            ResourceKind::Vector => "vector",
            ResourceKind::Csv => "csv",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RendererMode {
    #[default]
    Discrete,
    Continuous,
}

impl FromStr for RendererMode {
    type Err = SldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discrete" => Ok(RendererMode::Discrete),
            "continuous" => Ok(RendererMode::Continuous),
            _ => Err(SldError::UnsupportedRendererMode(s.trim().to_string())),
        }
    }
}

impl fmt::Display for RendererMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererMode::Discrete => f.write_str("discrete"),
            RendererMode::Continuous => f.write_str("continuous"),
        }
    }
}

/// Per-call translator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateOptions {
    pub resource_kind: ResourceKind,
    pub renderer_mode: RendererMode,
    /// Emit `tracing` diagnostics. Off means the translator is silent.
    pub debug: bool,
    pub legend_title: String,
    pub opacity: f64,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            resource_kind: ResourceKind::Vector,
            renderer_mode: RendererMode::Discrete,
            debug: false,
            legend_title: "Legend".to_string(),
            opacity: 0.8,
        }
    }
}

impl TranslateOptions {
    pub fn new(resource_kind: ResourceKind, renderer_mode: RendererMode) -> Self {
        Self {
            resource_kind,
            renderer_mode,
            ..Self::default()
        }
    }

    /// Defaults with `debug` taken from `TERRIA_DEBUG` at the time of the call.
    pub fn from_env() -> Self {
        Self {
            debug: debug_from_env(),
            ..Self::default()
        }
    }

    pub fn with_resource_kind(mut self, kind: ResourceKind) -> Self {
        self.resource_kind = kind;
        self
    }

    pub fn with_renderer_mode(mut self, mode: RendererMode) -> Self {
        self.renderer_mode = mode;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_legend_title(mut self, title: impl Into<String>) -> Self {
        self.legend_title = title.into();
        self
    }

    /// Clamped to `[0, 1]`.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            Self::default().opacity
        };
        self
    }
}

/// Read `TERRIA_DEBUG` now. Accepts `1`, `true`, `yes`, `on` in any case.
pub fn debug_from_env() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
