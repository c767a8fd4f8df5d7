//! # Style Normalizer
//!
//! Single entry point [`normalize`] turning classified rules into the ordered
//! [`StyleModel`], plus [`continuous_stops`] for gradient rendering.
//!
//! Ordering is tiered: ranges, then enums, then catch-alls. Numeric
//! comparison only ever happens inside a tier, so a legend mixing numeric
//! bins and text categories always sorts.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::model::{Bound, ColorStop, Range, RuleKind, StyleModel, StyleRule};

/// Identity of a rule for deduplication. Ranges and enums are keyed by what
/// they match; rules that match nothing specific only collapse when title and
/// colour are identical too.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RuleKey {
    Range(Option<(u64, bool)>, Option<(u64, bool)>),
    Enum(String),
    Unmatched { is_else: bool, title: String, color: String },
}

fn bound_key(bound: Option<Bound>) -> Option<(u64, bool)> {
    // -0.0 and 0.0 are the same boundary
    bound.map(|b| ((b.value + 0.0).to_bits(), b.inclusive))
}

fn rule_key(rule: &StyleRule) -> RuleKey {
    match &rule.kind {
        RuleKind::Range(r) => RuleKey::Range(bound_key(r.lower), bound_key(r.upper)),
        RuleKind::Enum(v) => RuleKey::Enum(v.clone()),
        RuleKind::Else | RuleKind::CatchAll => RuleKey::Unmatched {
            is_else: rule.kind == RuleKind::Else,
            title: rule.title.clone(),
            color: rule.color.clone(),
        },
    }
}

/// Deduplicate and order classified rules.
pub fn normalize(rules: Vec<StyleRule>) -> StyleModel {
    let mut seen = HashSet::new();
    let mut unique: Vec<StyleRule> = rules
        .into_iter()
        .filter(|rule| seen.insert(rule_key(rule)))
        .collect();

    // stable: equal keys keep document order
    unique.sort_by(compare_rules);

    StyleModel::from_ordered(unique)
}

fn tier(kind: &RuleKind) -> u8 {
    match kind {
        RuleKind::Range(_) => 0,
        RuleKind::Enum(_) => 1,
        RuleKind::Else | RuleKind::CatchAll => 2,
    }
}

fn compare_rules(a: &StyleRule, b: &StyleRule) -> Ordering {
    match (&a.kind, &b.kind) {
        (RuleKind::Range(ra), RuleKind::Range(rb)) => compare_ranges(ra, rb),
        (RuleKind::Enum(va), RuleKind::Enum(vb)) => compare_enum_values(va, vb),
        (ka, kb) => tier(ka).cmp(&tier(kb)),
    }
}

/// Missing lower bound first, then ascending lower bound; ties go to the
/// inclusive side, then to the smaller upper bound (missing upper last).
fn compare_ranges(a: &Range, b: &Range) -> Ordering {
    let lower = match (a.lower, b.lower) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x
            .value
            .total_cmp(&y.value)
            .then_with(|| y.inclusive.cmp(&x.inclusive)),
    };

    lower.then_with(|| match (a.upper, b.upper) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x
            .value
            .total_cmp(&y.value)
            .then_with(|| x.inclusive.cmp(&y.inclusive)),
    })
}

fn numeric(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric match values first in numeric order, then text case-insensitively.
fn compare_enum_values(a: &str, b: &str) -> Ordering {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
    }
}

/// Piecewise colormap from the model's range rules.
///
/// Each range contributes a stop at its lower edge. A missing edge is taken
/// from the neighbouring rule's facing edge. An open first or last range is
/// extended by its neighbour's width instead, so its colour keeps a visible
/// band; with no bounded neighbour the rule's own other edge is used. A gap
/// between two ranges is split at its midpoint (nearest-neighbour fill), an
/// overlap is clamped so stop values never decrease, and a closing stop at
/// the last upper edge carries the last colour.
fn width(range: &Range) -> Option<f64> {
    match (range.lower, range.upper) {
        (Some(lower), Some(upper)) if upper.value > lower.value => Some(upper.value - lower.value),
        _ => None,
    }
}

pub fn continuous_stops(model: &StyleModel) -> Vec<ColorStop> {
    let ranges: Vec<(&StyleRule, &Range)> = model.ranges().collect();

    let mut spans: Vec<(f64, f64, &str)> = Vec::with_capacity(ranges.len());
    for (i, (rule, range)) in ranges.iter().enumerate() {
        let previous = i.checked_sub(1).map(|p| ranges[p].1);
        let next = ranges.get(i + 1).map(|(_, r)| *r);

        let lower = range
            .lower
            .map(|b| b.value)
            .or_else(|| previous.and_then(|p| p.upper).map(|b| b.value))
            .or_else(|| {
                let upper = range.upper?.value;
                Some(next.and_then(width).map_or(upper, |w| upper - w))
            });
        let upper = range
            .upper
            .map(|b| b.value)
            .or_else(|| next.and_then(|n| n.lower).map(|b| b.value))
            .or_else(|| {
                let lower = lower?;
                Some(previous.and_then(width).map_or(lower, |w| lower + w))
            });

        if let (Some(lower), Some(upper)) = (lower, upper) {
            spans.push((lower, upper, rule.color.as_str()));
        }
    }

    let mut stops: Vec<ColorStop> = Vec::with_capacity(spans.len() + 1);
    let mut reach: Option<f64> = None;

    for (lower, upper, color) in spans {
        let mut value = match reach {
            Some(prev) if lower > prev => (prev + lower) / 2.0,
            _ => lower,
        };
        if let Some(last) = stops.last() {
            value = value.max(last.value);
        }
        stops.push(ColorStop {
            value,
            color: color.to_string(),
        });
        reach = Some(reach.map_or(upper, |r| r.max(upper)));
    }

    if let (Some(end), Some(last)) = (reach, stops.last()) {
        if end > last.value {
            let color = last.color.clone();
            stops.push(ColorStop { value: end, color });
        }
    }

    stops
}
