//! # Rule Classifier
//!
//! Decides for each raw rule whether it is a numeric range, an enumerated
//! match or a catch-all, and resolves its title and colour.
//!
//! Classification never fails as a whole. A missing colour or a non-numeric
//! bound is recorded as a defect and the rule degrades (default colour, or
//! demotion to catch-all) while the rest of the document is unaffected.

use crate::color::{normalize_color, DEFAULT_FILL};
use crate::error::SldError;
use crate::model::{Bound, Range, RuleKind, StyleRule};
use crate::parser::{ColorMap, ColorMapEntry, ColorMapType, ComparisonOp, FilterExpr, RawRule, SldDocument};

const MAX_TITLE_CHARS: usize = 100;

/// Classified rules in document order plus the defects met on the way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classified {
    pub rules: Vec<StyleRule>,
    pub defects: Vec<SldError>,
    /// Filter conditions left out of a rule's classification.
    pub notes: Vec<String>,
}

impl Classified {
    fn extend(&mut self, other: Classified) {
        self.rules.extend(other.rules);
        self.defects.extend(other.defects);
        self.notes.extend(other.notes);
    }
}

/// Filter shape before the rule is assembled.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Range { property: String, range: Range },
    Enum { property: String, value: String },
    CatchAll,
}

/// Classify every rule of a document. Rules carrying a raster `ColorMap`
/// expand into one entry per `ColorMapEntry`.
pub fn classify_document(doc: &SldDocument, debug: bool) -> Classified {
    let mut out = Classified::default();
    for raw in &doc.rules {
        let classified = match &raw.color_map {
            Some(map) if !map.entries.is_empty() => classify_color_map(raw, map),
            _ => classify_rule(raw),
        };
        for rule in &classified.rules {
            diag!(
                debug,
                "rule {}: '{}' -> {} {}",
                raw.number,
                rule.title,
                rule.kind.name(),
                rule.color
            );
        }
        for defect in &classified.defects {
            diag!(debug, "rule {}: {}", raw.number, defect);
        }
        for note in &classified.notes {
            diag!(debug, "rule {}: {}", raw.number, note);
        }
        out.extend(classified);
    }
    out
}

/// Classify one filter-based rule.
pub fn classify_rule(raw: &RawRule) -> Classified {
    let mut defects = Vec::new();
    let mut notes = Vec::new();

    let color = resolve_color(raw, &mut defects);

    let (kind, property) = match (&raw.filter, raw.else_filter) {
        (Some(expr), false) => {
            let shape = evaluate(expr, raw.number, &mut notes).unwrap_or_else(|defect| {
                defects.push(defect);
                Shape::CatchAll
            });
            match shape {
                Shape::Range { property, range } => (RuleKind::Range(range), Some(property)),
                Shape::Enum { property, value } => (RuleKind::Enum(value), Some(property)),
                Shape::CatchAll => (RuleKind::CatchAll, None),
            }
        }
        _ => (RuleKind::Else, None),
    };

    Classified {
        rules: vec![StyleRule {
            title: rule_title(raw),
            kind,
            color,
            property,
        }],
        defects,
        notes,
    }
}

fn resolve_color(raw: &RawRule, defects: &mut Vec<SldError>) -> String {
    let found = raw
        .fill
        .as_deref()
        .and_then(normalize_color)
        .or_else(|| raw.stroke.as_deref().and_then(normalize_color));

    found.unwrap_or_else(|| {
        defects.push(SldError::MissingColor { rule: raw.number });
        DEFAULT_FILL.to_string()
    })
}

/// Title, then name, then "Style n"; long titles are cut.
pub fn rule_title(raw: &RawRule) -> String {
    let title = raw
        .title
        .clone()
        .or_else(|| raw.name.clone())
        .unwrap_or_else(|| format!("Style {}", raw.number));
    truncate_title(&title)
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let cut: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}

/// Parse a numeric bound. Period decimal separator only; non-finite values are rejected.
pub fn parse_literal(literal: &str, rule: usize) -> Result<f64, SldError> {
    let trimmed = literal.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(SldError::InvalidLiteral {
            rule,
            literal: trimmed.to_string(),
        }),
    }
}

fn evaluate(expr: &FilterExpr, rule: usize, notes: &mut Vec<String>) -> Result<Shape, SldError> {
    match expr {
        FilterExpr::Comparison {
            op,
            property,
            literal,
        } => {
            let property = property.clone();
            let mut range = Range::default();
            match op {
                ComparisonOp::EqualTo => {
                    return Ok(Shape::Enum {
                        property,
                        value: literal.trim().to_string(),
                    })
                }
                ComparisonOp::NotEqualTo | ComparisonOp::Like => return Ok(Shape::CatchAll),
                ComparisonOp::GreaterThan => {
                    range.lower = Some(Bound::exclusive(parse_literal(literal, rule)?))
                }
                ComparisonOp::GreaterThanOrEqualTo => {
                    range.lower = Some(Bound::inclusive(parse_literal(literal, rule)?))
                }
                ComparisonOp::LessThan => {
                    range.upper = Some(Bound::exclusive(parse_literal(literal, rule)?))
                }
                ComparisonOp::LessThanOrEqualTo => {
                    range.upper = Some(Bound::inclusive(parse_literal(literal, rule)?))
                }
            }
            Ok(Shape::Range { property, range })
        }
        FilterExpr::Between {
            property,
            lower,
            upper,
        } => Ok(Shape::Range {
            property: property.clone(),
            range: Range::new(
                Some(Bound::inclusive(parse_literal(lower, rule)?)),
                Some(Bound::inclusive(parse_literal(upper, rule)?)),
            ),
        }),
        FilterExpr::And(children) => evaluate_and(children, rule, notes),
        FilterExpr::Or(children) => evaluate_or(children, rule, notes),
        FilterExpr::Not(_) | FilterExpr::Unsupported(_) => Ok(Shape::CatchAll),
    }
}

/// Intersect every child: bounds tighten, an equality wins outright.
///
/// Only conditions on the first property seen take part; conditions on any
/// other attribute are left out and noted.
fn evaluate_and(
    children: &[FilterExpr],
    rule: usize,
    notes: &mut Vec<String>,
) -> Result<Shape, SldError> {
    let mut range = Range::default();
    let mut property: Option<String> = None;
    let mut value: Option<String> = None;

    for child in children {
        let shape = evaluate(child, rule, notes)?;
        let child_property = match &shape {
            Shape::Range { property, .. } | Shape::Enum { property, .. } => Some(property),
            Shape::CatchAll => None,
        };
        if let (Some(first), Some(other)) = (&property, child_property) {
            if first != other {
                notes.push(format!(
                    "condition on '{}' ignored, rule classified on '{}'",
                    other, first
                ));
                continue;
            }
        }

        match shape {
            Shape::Range { property: p, range: r } => {
                property.get_or_insert(p);
                if let Some(lower) = r.lower {
                    range.tighten_lower(lower);
                }
                if let Some(upper) = r.upper {
                    range.tighten_upper(upper);
                }
            }
            Shape::Enum { property: p, value: v } => {
                property.get_or_insert(p);
                value.get_or_insert(v);
            }
            Shape::CatchAll => {}
        }
    }

    Ok(match (property, value) {
        (Some(property), Some(value)) => Shape::Enum { property, value },
        (Some(property), None) if !range.is_unbounded() => Shape::Range { property, range },
        _ => Shape::CatchAll,
    })
}

/// Union of ranges becomes their hull; any other mix keeps the first usable child.
fn evaluate_or(
    children: &[FilterExpr],
    rule: usize,
    notes: &mut Vec<String>,
) -> Result<Shape, SldError> {
    let shapes = children
        .iter()
        .map(|c| evaluate(c, rule, notes))
        .collect::<Result<Vec<_>, _>>()?;

    let all_ranges = !shapes.is_empty() && shapes.iter().all(|s| matches!(s, Shape::Range { .. }));
    if all_ranges {
        let mut iter = shapes.into_iter();
        let Some(Shape::Range { property, range }) = iter.next() else {
            return Ok(Shape::CatchAll);
        };
        let range = iter.fold(range, |acc, s| match s {
            Shape::Range { range, .. } => acc.hull(&range),
            _ => acc,
        });
        return Ok(Shape::Range { property, range });
    }

    Ok(shapes
        .into_iter()
        .find(|s| *s != Shape::CatchAll)
        .unwrap_or(Shape::CatchAll))
}

/// Expand a raster `ColorMap` into one rule per entry.
pub fn classify_color_map(raw: &RawRule, map: &ColorMap) -> Classified {
    let mut out = Classified::default();

    let quantities: Vec<Result<f64, SldError>> = map
        .entries
        .iter()
        .map(|e| parse_literal(&e.quantity, raw.number))
        .collect();
    let valid: Vec<f64> = quantities.iter().filter_map(|q| q.as_ref().ok().copied()).collect();

    let mut valid_index: usize = 0;
    for (entry, quantity) in map.entries.iter().zip(quantities) {
        let kind = match quantity {
            Err(defect) => {
                out.defects.push(defect);
                RuleKind::CatchAll
            }
            Ok(q) => {
                let i = valid_index;
                valid_index += 1;
                match map.map_type {
                    ColorMapType::Values => RuleKind::Enum(entry.quantity.clone()),
                    ColorMapType::Intervals => {
                        let lower = i.checked_sub(1).map(|p| Bound::inclusive(valid[p]));
                        RuleKind::Range(Range::new(lower, Some(Bound::exclusive(q))))
                    }
                    ColorMapType::Ramp => {
                        let upper = match valid.get(i + 1) {
                            Some(&next) => Bound::exclusive(next),
                            None => Bound::inclusive(q),
                        };
                        RuleKind::Range(Range::new(Some(Bound::inclusive(q)), Some(upper)))
                    }
                }
            }
        };

        let color = entry_color(entry).unwrap_or_else(|| {
            out.defects.push(SldError::MissingColor { rule: raw.number });
            DEFAULT_FILL.to_string()
        });

        let title = entry
            .label
            .clone()
            .unwrap_or_else(|| entry.quantity.clone());

        out.rules.push(StyleRule {
            title: truncate_title(&title),
            kind,
            color,
            property: None,
        });
    }

    out
}

fn entry_color(entry: &ColorMapEntry) -> Option<String> {
    entry.color.as_deref().and_then(normalize_color)
}
