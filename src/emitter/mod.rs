//! # Config Emitter
//!
//! Shapes a [`StyleModel`] into the [`ResourceConfig`] a TerriaJS catalog item
//! expects for its resource kind:
//!
//! * raster: `renderOptions.single.colors` pairs,
//! * vector: a `styles` entry with a bin, enum or continuous colour map,
//! * csv: the vector style plus time spreading.
//!
//! Every kind carries the legend in model order and the layer opacity.

pub mod colormap;
pub mod config;

pub use colormap::{ColorBin, DiscreteColorMap};
pub use config::{
    EnumColor, Legend, LegendItem, MapType, RenderOptions, ResourceConfig, SingleBandOptions,
    TableColorStyle, TableStyle, TimeStyle,
};

use crate::color::DEFAULT_FILL;
use crate::error::Result;
use crate::model::StyleModel;
use crate::normalizer::continuous_stops;
use crate::options::{RendererMode, ResourceKind, TranslateOptions};

const MAX_STYLE_ID_CHARS: usize = 50;
const CSV_STYLE_ID: &str = "default";

pub struct ConfigEmitter {
    legend_title: String,
    opacity: f64,
    debug: bool,
}

impl Default for ConfigEmitter {
    fn default() -> Self {
        Self::new(&TranslateOptions::default())
    }
}

impl ConfigEmitter {
    pub fn new(options: &TranslateOptions) -> Self {
        Self {
            legend_title: options.legend_title.clone(),
            opacity: options.opacity,
            debug: options.debug,
        }
    }

    /// Emit for a kind given by name (`raster`, `vector`, `csv`).
    ///
    /// # Errors
    ///
    /// [`crate::SldError::UnsupportedResourceKind`] for any other name.
    pub fn emit_for(
        &self,
        model: &StyleModel,
        kind: &str,
        mode: RendererMode,
    ) -> Result<ResourceConfig> {
        let kind: ResourceKind = kind.parse()?;
        Ok(self.emit(model, kind, mode))
    }

    pub fn emit(&self, model: &StyleModel, kind: ResourceKind, mode: RendererMode) -> ResourceConfig {
        diag!(
            self.debug,
            "emitting {} config ({}) for {} legend entries",
            kind,
            mode,
            model.len()
        );

        let mut config = ResourceConfig {
            kind,
            legends: vec![self.legend(model)],
            render_options: None,
            styles: Vec::new(),
            active_style: None,
            opacity: self.opacity,
        };

        match kind {
            ResourceKind::Raster => {
                config.render_options = self.raster_options(model, mode);
            }
            ResourceKind::Vector | ResourceKind::Csv => {
                if let Some(style) = self.table_style(model, kind, mode) {
                    config.active_style = Some(style.id.clone());
                    config.styles.push(style);
                }
            }
        }

        config
    }

    fn legend(&self, model: &StyleModel) -> Legend {
        Legend {
            title: self.legend_title.clone(),
            items: model
                .rules()
                .iter()
                .map(|r| LegendItem {
                    title: r.title.clone(),
                    color: r.color.clone(),
                })
                .collect(),
        }
    }

    fn raster_options(&self, model: &StyleModel, mode: RendererMode) -> Option<RenderOptions> {
        let colors: Vec<(f64, String)> = match mode {
            RendererMode::Continuous => continuous_stops(model)
                .into_iter()
                .map(|s| (s.value, s.color))
                .collect(),
            RendererMode::Discrete => DiscreteColorMap::from_model(model).entries(),
        };

        if colors.is_empty() {
            diag!(self.debug, "no numeric entries, raster colormap omitted");
            return None;
        }

        Some(RenderOptions {
            single: SingleBandOptions {
                colors,
                use_real_value: true,
            },
        })
    }

    fn table_style(
        &self,
        model: &StyleModel,
        kind: ResourceKind,
        mode: RendererMode,
    ) -> Option<TableStyle> {
        let Some(column) = model.property() else {
            diag!(self.debug, "no filtered rules, emitting legend only");
            return None;
        };

        let null_color = model
            .catch_all()
            .map(|r| r.color.clone())
            .unwrap_or_else(|| DEFAULT_FILL.to_string());

        let color = match mode {
            RendererMode::Continuous => self
                .continuous_color(model, column, &null_color)
                .or_else(|| {
                    diag!(self.debug, "no ranges for continuous mode, falling back to discrete");
                    self.discrete_color(model, column, &null_color)
                }),
            RendererMode::Discrete => self.discrete_color(model, column, &null_color),
        }?;

        let (id, time) = match kind {
            ResourceKind::Csv => (
                CSV_STYLE_ID.to_string(),
                Some(TimeStyle {
                    spread_start_time: true,
                    spread_finish_time: true,
                }),
            ),
            _ => (sanitize_style_id(column), None),
        };

        Some(TableStyle {
            id,
            title: column.to_string(),
            color,
            time,
        })
    }

    fn discrete_color(
        &self,
        model: &StyleModel,
        column: &str,
        null_color: &str,
    ) -> Option<TableColorStyle> {
        let ranges: Vec<_> = model.ranges().collect();

        if !ranges.is_empty() {
            let enum_count = model.enums().count();
            if enum_count > 0 {
                diag!(self.debug, "{} enum rules not representable in a bin style", enum_count);
            }

            let bin_maximums = ranges
                .iter()
                .enumerate()
                .map(|(i, (_, range))| {
                    range
                        .upper
                        .or_else(|| ranges.get(i + 1).and_then(|(_, next)| next.lower))
                        .map_or(f64::MAX, |b| b.value)
                })
                .collect();
            let bin_colors = ranges.iter().map(|(rule, _)| rule.color.clone()).collect();

            return Some(TableColorStyle {
                map_type: MapType::Bin,
                color_column: column.to_string(),
                minimum_value: None,
                maximum_value: None,
                bin_maximums: Some(bin_maximums),
                bin_colors: Some(bin_colors),
                enum_colors: None,
                null_color: null_color.to_string(),
            });
        }

        let enum_colors: Vec<EnumColor> = model
            .enums()
            .map(|(rule, value)| EnumColor {
                value: value.to_string(),
                color: rule.color.clone(),
            })
            .collect();

        if enum_colors.is_empty() {
            return None;
        }

        Some(TableColorStyle {
            map_type: MapType::Enum,
            color_column: column.to_string(),
            minimum_value: None,
            maximum_value: None,
            bin_maximums: None,
            bin_colors: None,
            enum_colors: Some(enum_colors),
            null_color: null_color.to_string(),
        })
    }

    fn continuous_color(
        &self,
        model: &StyleModel,
        column: &str,
        null_color: &str,
    ) -> Option<TableColorStyle> {
        let stops = continuous_stops(model);
        let (first, last) = (stops.first()?, stops.last()?);

        Some(TableColorStyle {
            map_type: MapType::Continuous,
            color_column: column.to_string(),
            minimum_value: Some(first.value),
            maximum_value: Some(last.value),
            bin_maximums: Some(stops.iter().map(|s| s.value).collect()),
            bin_colors: Some(stops.iter().map(|s| s.color.clone()).collect()),
            enum_colors: None,
            null_color: null_color.to_string(),
        })
    }
}

/// Restrict a style id to `[A-Za-z0-9_-]`, at most 50 characters, not starting with a digit.
pub fn sanitize_style_id(raw: &str) -> String {
    let mut id: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STYLE_ID_CHARS)
        .collect();

    if id.is_empty() {
        return "default_style".to_string();
    }
    if id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert_str(0, "style_");
    }
    id
}
