use crate::color::DEFAULT_FILL;
use crate::model::{Bound, Range, StyleModel};

/// One discrete bin with its exact boundary semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBin {
    pub title: String,
    pub range: Range,
    pub color: String,
}

impl ColorBin {
    pub fn contains(&self, value: f64) -> bool {
        self.range.contains(value)
    }

    /// Value the bin is keyed by in a raster colormap: its upper edge, or
    /// its lower edge when open above.
    pub fn key(&self) -> Option<f64> {
        self.range.upper.or(self.range.lower).map(|b| b.value)
    }
}

/// Step colormap derived from a model's range rules and numeric enum rules.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscreteColorMap {
    bins: Vec<ColorBin>,
    fallback: String,
}

impl DiscreteColorMap {
    pub fn from_model(model: &StyleModel) -> Self {
        let mut bins: Vec<ColorBin> = model
            .ranges()
            .map(|(rule, range)| ColorBin {
                title: rule.title.clone(),
                range: *range,
                color: rule.color.clone(),
            })
            .collect();

        bins.extend(model.enums().filter_map(|(rule, value)| {
            let v = value.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
            Some(ColorBin {
                title: rule.title.clone(),
                range: Range::new(Some(Bound::inclusive(v)), Some(Bound::inclusive(v))),
                color: rule.color.clone(),
            })
        }));

        let fallback = model
            .catch_all()
            .map(|r| r.color.clone())
            .unwrap_or_else(|| DEFAULT_FILL.to_string());

        Self { bins, fallback }
    }

    pub fn bins(&self) -> &[ColorBin] {
        &self.bins
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// First bin containing `value`, in model order.
    pub fn bin_for(&self, value: f64) -> Option<&ColorBin> {
        self.bins.iter().find(|b| b.contains(value))
    }

    /// Colour for `value`; the catch-all colour when no bin matches.
    pub fn color_for(&self, value: f64) -> &str {
        self.bin_for(value)
            .map(|b| b.color.as_str())
            .unwrap_or(&self.fallback)
    }

    /// `(key, colour)` pairs for a raster colormap.
    pub fn entries(&self) -> Vec<(f64, String)> {
        self.bins
            .iter()
            .filter_map(|b| b.key().map(|k| (k, b.color.clone())))
            .collect()
    }
}
