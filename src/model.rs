use std::fmt;

/// One side of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

/// A numeric interval. A missing side is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl Range {
    pub fn new(lower: Option<Bound>, upper: Option<Bound>) -> Self {
        Self { lower, upper }
    }

    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        let above_lower = match self.lower {
            Some(b) if b.inclusive => value >= b.value,
            Some(b) => value > b.value,
            None => true,
        };
        let below_upper = match self.upper {
            Some(b) if b.inclusive => value <= b.value,
            Some(b) => value < b.value,
            None => true,
        };
        above_lower && below_upper
    }

    /// Narrow the lower side: the larger value wins, exclusive wins a tie.
    pub fn tighten_lower(&mut self, bound: Bound) {
        self.lower = Some(match self.lower {
            Some(cur) if cur.value > bound.value => cur,
            Some(cur) if cur.value == bound.value => Bound {
                value: cur.value,
                inclusive: cur.inclusive && bound.inclusive,
            },
            _ => bound,
        });
    }

    /// Narrow the upper side: the smaller value wins, exclusive wins a tie.
    pub fn tighten_upper(&mut self, bound: Bound) {
        self.upper = Some(match self.upper {
            Some(cur) if cur.value < bound.value => cur,
            Some(cur) if cur.value == bound.value => Bound {
                value: cur.value,
                inclusive: cur.inclusive && bound.inclusive,
            },
            _ => bound,
        });
    }

    /// Smallest range covering both. An open side on either input stays open.
    pub fn hull(&self, other: &Range) -> Range {
        let lower = match (self.lower, other.lower) {
            (Some(a), Some(b)) if a.value < b.value => Some(a),
            (Some(a), Some(b)) if b.value < a.value => Some(b),
            (Some(a), Some(b)) => Some(Bound {
                value: a.value,
                inclusive: a.inclusive || b.inclusive,
            }),
            _ => None,
        };
        let upper = match (self.upper, other.upper) {
            (Some(a), Some(b)) if a.value > b.value => Some(a),
            (Some(a), Some(b)) if b.value > a.value => Some(b),
            (Some(a), Some(b)) => Some(Bound {
                value: a.value,
                inclusive: a.inclusive || b.inclusive,
            }),
            _ => None,
        };
        Range { lower, upper }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lower {
            Some(b) => write!(f, "{}{}", if b.inclusive { "[" } else { "(" }, b.value)?,
            None => write!(f, "(-inf")?,
        }
        match self.upper {
            Some(b) => write!(f, ", {}{}", b.value, if b.inclusive { "]" } else { ")" }),
            None => write!(f, ", +inf)"),
        }
    }
}

/// How a rule selects features.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// Continuous numeric interval.
    Range(Range),
    /// Discrete match against a literal.
    Enum(String),
    /// `ElseFilter` or no filter at all: colours whatever no other rule matches.
    Else,
    /// Filter no bin can express (`Like`, `Not`, a bad literal...). Listed in
    /// the legend but never given a bin.
    CatchAll,
}

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Range(_) => "range",
            RuleKind::Enum(_) => "enum",
            RuleKind::Else => "else",
            RuleKind::CatchAll => "catch-all",
        }
    }
}

/// One classified legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub title: String,
    pub kind: RuleKind,
    /// Upper-case `#RRGGBB`.
    pub color: String,
    /// Attribute the filter compares against, if any.
    pub property: Option<String>,
}

impl StyleRule {
    pub fn range(&self) -> Option<&Range> {
        match &self.kind {
            RuleKind::Range(r) => Some(r),
            _ => None,
        }
    }

    pub fn lower_bound(&self) -> Option<Bound> {
        self.range().and_then(|r| r.lower)
    }

    pub fn upper_bound(&self) -> Option<Bound> {
        self.range().and_then(|r| r.upper)
    }

    pub fn match_value(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self.kind, RuleKind::Else | RuleKind::CatchAll)
    }
}

/// The ordered legend of one resource.
///
/// Built by [`crate::normalizer::normalize`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleModel {
    rules: Vec<StyleRule>,
    property: Option<String>,
}

impl StyleModel {
    pub(crate) fn from_ordered(rules: Vec<StyleRule>) -> Self {
        let property = rules.iter().find_map(|r| r.property.clone());
        Self { rules, property }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First attribute name referenced by any rule filter.
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn ranges(&self) -> impl Iterator<Item = (&StyleRule, &Range)> {
        self.rules.iter().filter_map(|r| r.range().map(|range| (r, range)))
    }

    pub fn enums(&self) -> impl Iterator<Item = (&StyleRule, &str)> {
        self.rules
            .iter()
            .filter_map(|r| r.match_value().map(|v| (r, v)))
    }

    /// Rule supplying the colour for unmatched features: the first `Else`
    /// rule, otherwise the first catch-all.
    pub fn catch_all(&self) -> Option<&StyleRule> {
        self.rules
            .iter()
            .find(|r| r.kind == RuleKind::Else)
            .or_else(|| self.rules.iter().find(|r| r.is_catch_all()))
    }
}

/// A `(value, colour)` pair of a piecewise colormap.
///
/// The colour applies from `value` up to the next stop.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStop {
    pub value: f64,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains_respects_inclusivity() {
        let range = Range::new(Some(Bound::exclusive(0.2)), Some(Bound::inclusive(0.5)));
        assert!(!range.contains(0.2));
        assert!(range.contains(0.2000001));
        assert!(range.contains(0.5));
        assert!(!range.contains(0.5000001));
    }

    #[test]
    fn test_open_ended_range() {
        let range = Range::new(None, Some(Bound::exclusive(10.0)));
        assert!(range.contains(-1e9));
        assert!(!range.contains(10.0));
        assert_eq!(range.to_string(), "(-inf, 10)");
    }

    #[test]
    fn test_tighten_keeps_most_restrictive() {
        let mut range = Range::default();
        range.tighten_lower(Bound::inclusive(1.0));
        range.tighten_lower(Bound::exclusive(1.0));
        range.tighten_lower(Bound::inclusive(0.5));
        assert_eq!(range.lower, Some(Bound::exclusive(1.0)));

        range.tighten_upper(Bound::inclusive(5.0));
        range.tighten_upper(Bound::inclusive(7.0));
        assert_eq!(range.upper, Some(Bound::inclusive(5.0)));
    }

    #[test]
    fn test_hull() {
        let a = Range::new(Some(Bound::inclusive(0.0)), Some(Bound::exclusive(1.0)));
        let b = Range::new(Some(Bound::exclusive(2.0)), Some(Bound::inclusive(3.0)));
        let hull = a.hull(&b);
        assert_eq!(hull.lower, Some(Bound::inclusive(0.0)));
        assert_eq!(hull.upper, Some(Bound::inclusive(3.0)));

        let open = Range::new(None, Some(Bound::inclusive(1.0)));
        assert_eq!(open.hull(&b).lower, None);
    }

    #[test]
    fn test_model_property_is_first_seen() {
        let model = StyleModel::from_ordered(vec![
            StyleRule {
                title: "Other".to_string(),
                kind: RuleKind::CatchAll,
                color: "#808080".to_string(),
                property: None,
            },
            StyleRule {
                title: "Low".to_string(),
                kind: RuleKind::Enum("1".to_string()),
                color: "#FF0000".to_string(),
                property: Some("CLASS".to_string()),
            },
        ]);
        assert_eq!(model.property(), Some("CLASS"));
        assert_eq!(model.enums().count(), 1);
        assert_eq!(model.catch_all().map(|r| r.title.as_str()), Some("Other"));
    }

    #[test]
    fn test_else_rule_supplies_null_colour_before_catch_all() {
        let rule = |title: &str, kind: RuleKind, color: &str| StyleRule {
            title: title.to_string(),
            kind,
            color: color.to_string(),
            property: None,
        };
        let model = StyleModel::from_ordered(vec![
            rule("Bad literal", RuleKind::CatchAll, "#0000FF"),
            rule("Other", RuleKind::Else, "#CCCCCC"),
        ]);
        assert_eq!(model.catch_all().map(|r| r.color.as_str()), Some("#CCCCCC"));
        assert!(model.rules().iter().all(|r| r.is_catch_all()));
    }
}
