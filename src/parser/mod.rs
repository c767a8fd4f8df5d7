//! # SLD Parser
//!
//! Turns raw Styled Layer Descriptor bytes into an [`SldDocument`]: the rule
//! list of the first `FeatureTypeStyle` in the document, each rule reduced to
//! its title, filter expression, colour parameters and optional raster
//! `ColorMap`.
//!
//! Namespace prefixes are ignored (`sld:`, `se:`, `ogc:` or none), and so is
//! every element the translator has no use for. SLD 1.0.0 and the
//! Symbology Encoding flavour of 1.1.0 both parse.
//!
//! The parser performs no I/O and never logs; fetching the document is the
//! caller's job.

pub mod filter;
pub mod tree;

pub use filter::{ComparisonOp, FilterExpr};

use crate::error::{Result, SldError};
use tree::{parse_tree, Element};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parsed SLD content relevant to legend translation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SldDocument {
    /// `version` attribute of `StyledLayerDescriptor`.
    pub version: Option<String>,
    /// Name of the first `NamedLayer`/`UserLayer`.
    pub layer_name: Option<String>,
    /// Title of the `UserStyle` holding the translated `FeatureTypeStyle`.
    pub style_title: Option<String>,
    pub rules: Vec<RawRule>,
}

/// One `<Rule>` as written, before classification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRule {
    /// 1-based position inside the `FeatureTypeStyle`.
    pub number: usize,
    pub name: Option<String>,
    pub title: Option<String>,
    pub filter: Option<FilterExpr>,
    pub else_filter: bool,
    /// Raw `fill` parameter text, un-normalised.
    pub fill: Option<String>,
    /// Raw `stroke` parameter text, un-normalised.
    pub stroke: Option<String>,
    pub color_map: Option<ColorMap>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMapType {
    #[default]
    Ramp,
    Intervals,
    Values,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorMap {
    pub map_type: ColorMapType,
    pub entries: Vec<ColorMapEntry>,
}

/// Attribute values of one `ColorMapEntry`, unparsed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorMapEntry {
    pub quantity: String,
    pub color: Option<String>,
    pub label: Option<String>,
    pub opacity: Option<String>,
}

/// Decode SLD bytes: strip a UTF-8 BOM, fall back to Latin-1 for non-UTF-8 input.
pub fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Parse an SLD document.
///
/// # Errors
///
/// [`SldError::MalformedDocument`] when the bytes are not well-formed XML,
/// the root is not `StyledLayerDescriptor`, or there is no `FeatureTypeStyle`
/// with at least one `Rule`.
pub fn parse_sld(bytes: &[u8]) -> Result<SldDocument> {
    let text = decode(bytes);
    let root = parse_tree(&text)?;

    if root.name != "StyledLayerDescriptor" {
        return Err(SldError::MalformedDocument(format!(
            "root element is <{}>, expected <StyledLayerDescriptor>",
            root.name
        )));
    }

    let layer = root
        .children
        .iter()
        .find(|c| c.name == "NamedLayer" || c.name == "UserLayer");
    let layer_name = layer.and_then(|l| l.child_text("Name"));

    let (user_style, feature_style) = find_feature_type_style(&root).ok_or_else(|| {
        SldError::MalformedDocument("no FeatureTypeStyle element found".to_string())
    })?;

    let rules: Vec<RawRule> = feature_style
        .children_named("Rule")
        .enumerate()
        .map(|(i, rule)| parse_rule(rule, i + 1))
        .collect();

    if rules.is_empty() {
        return Err(SldError::MalformedDocument(
            "FeatureTypeStyle contains no Rule elements".to_string(),
        ));
    }

    Ok(SldDocument {
        version: root.attr("version").map(str::to_string),
        layer_name,
        style_title: user_style.and_then(style_title),
        rules,
    })
}

/// First `FeatureTypeStyle` in document order, with its enclosing `UserStyle`.
fn find_feature_type_style(root: &Element) -> Option<(Option<&Element>, &Element)> {
    fn walk<'a>(
        element: &'a Element,
        user_style: Option<&'a Element>,
    ) -> Option<(Option<&'a Element>, &'a Element)> {
        for child in &element.children {
            if child.name == "FeatureTypeStyle" || child.name == "CoverageStyle" {
                return Some((user_style, child));
            }
            let scope = if child.name == "UserStyle" {
                Some(child)
            } else {
                user_style
            };
            if let Some(found) = walk(child, scope) {
                return Some(found);
            }
        }
        None
    }
    walk(root, None)
}

fn style_title(user_style: &Element) -> Option<String> {
    user_style.child_text("Title").or_else(|| {
        user_style
            .child("Description")
            .and_then(|d| d.child_text("Title"))
    })
}

fn parse_rule(rule: &Element, number: usize) -> RawRule {
    // SE 1.1 moves the title under <Description>
    let title = rule.child_text("Title").or_else(|| {
        rule.child("Description")
            .and_then(|d| d.child_text("Title"))
    });

    let filter = rule
        .child("Filter")
        .and_then(Element::first_element)
        .map(FilterExpr::from_element);

    let symbolizers: Vec<&Element> = rule
        .children
        .iter()
        .filter(|c| c.name.ends_with("Symbolizer") && c.name != "TextSymbolizer")
        .collect();

    let fill = symbolizers
        .iter()
        .find_map(|s| find_parameter(s, "Fill", "fill"));
    let stroke = symbolizers
        .iter()
        .find_map(|s| find_parameter(s, "Stroke", "stroke"));
    let color_map = symbolizers
        .iter()
        .filter(|s| s.name == "RasterSymbolizer")
        .find_map(|s| s.descendant("ColorMap"))
        .map(parse_color_map);

    RawRule {
        number,
        name: rule.child_text("Name"),
        title,
        filter,
        else_filter: rule.child("ElseFilter").is_some(),
        fill,
        stroke,
        color_map,
    }
}

/// Text of `<container><SvgParameter|CssParameter name="param">` anywhere below `element`.
fn find_parameter(element: &Element, container: &str, param: &str) -> Option<String> {
    for child in &element.children {
        if child.name == container {
            let value = child
                .children
                .iter()
                .filter(|p| p.name == "SvgParameter" || p.name == "CssParameter")
                .find(|p| p.attr("name") == Some(param))
                .map(Element::deep_text)
                .filter(|t| !t.is_empty());
            if value.is_some() {
                return value;
            }
        }
        if let Some(found) = find_parameter(child, container, param) {
            return Some(found);
        }
    }
    None
}

fn parse_color_map(element: &Element) -> ColorMap {
    let map_type = match element.attr("type").map(|t| t.trim().to_ascii_lowercase()) {
        Some(t) if t == "intervals" => ColorMapType::Intervals,
        Some(t) if t == "values" => ColorMapType::Values,
        _ => ColorMapType::Ramp,
    };

    let entries = element
        .children_named("ColorMapEntry")
        .map(|entry| ColorMapEntry {
            quantity: entry.attr("quantity").unwrap_or_default().trim().to_string(),
            color: entry.attr("color").map(str::to_string),
            label: entry
                .attr("label")
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            opacity: entry.attr("opacity").map(str::to_string),
        })
        .collect();

    ColorMap { map_type, entries }
}
