//! OGC filter expressions as a closed set of variants.

use super::tree::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    EqualTo,
    NotEqualTo,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    Like,
}

impl ComparisonOp {
    fn from_element_name(name: &str) -> Option<Self> {
        let op = match name {
            "PropertyIsEqualTo" => ComparisonOp::EqualTo,
            "PropertyIsNotEqualTo" => ComparisonOp::NotEqualTo,
            "PropertyIsLessThan" => ComparisonOp::LessThan,
            "PropertyIsLessThanOrEqualTo" => ComparisonOp::LessThanOrEqualTo,
            "PropertyIsGreaterThan" => ComparisonOp::GreaterThan,
            "PropertyIsGreaterThanOrEqualTo" => ComparisonOp::GreaterThanOrEqualTo,
            "PropertyIsLike" => ComparisonOp::Like,
            _ => return None,
        };
        Some(op)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Comparison {
        op: ComparisonOp,
        property: String,
        literal: String,
    },
    Between {
        property: String,
        lower: String,
        upper: String,
    },
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Not(Box<FilterExpr>),
    /// Anything a legend bin cannot express (spatial operators, `PropertyIsNull`,
    /// function calls, comparisons without a property). Keeps the element name.
    Unsupported(String),
}

impl FilterExpr {
    /// Build an expression from the element inside `<Filter>`.
    pub fn from_element(element: &Element) -> FilterExpr {
        match element.name.as_str() {
            "And" => FilterExpr::And(element.children.iter().map(FilterExpr::from_element).collect()),
            "Or" => FilterExpr::Or(element.children.iter().map(FilterExpr::from_element).collect()),
            "Not" => match element.first_element() {
                Some(inner) => FilterExpr::Not(Box::new(FilterExpr::from_element(inner))),
                None => FilterExpr::Unsupported("Not".to_string()),
            },
            "PropertyIsBetween" => Self::between(element),
            name => match ComparisonOp::from_element_name(name) {
                Some(op) => Self::comparison(op, element),
                None => FilterExpr::Unsupported(name.to_string()),
            },
        }
    }

    fn comparison(op: ComparisonOp, element: &Element) -> FilterExpr {
        // PropertyName and Literal may appear in either order
        match element.child_text("PropertyName") {
            Some(property) => FilterExpr::Comparison {
                op,
                property,
                literal: element.child_text("Literal").unwrap_or_default(),
            },
            None => FilterExpr::Unsupported(element.name.clone()),
        }
    }

    fn between(element: &Element) -> FilterExpr {
        let Some(property) = element.child_text("PropertyName") else {
            return FilterExpr::Unsupported(element.name.clone());
        };
        let boundary = |name: &str| {
            element
                .child(name)
                .map(|b| b.deep_text())
                .unwrap_or_default()
        };
        FilterExpr::Between {
            property,
            lower: boundary("LowerBoundary"),
            upper: boundary("UpperBoundary"),
        }
    }

    /// First property name referenced anywhere in the expression.
    pub fn property(&self) -> Option<&str> {
        match self {
            FilterExpr::Comparison { property, .. } | FilterExpr::Between { property, .. } => {
                Some(property)
            }
            FilterExpr::And(children) | FilterExpr::Or(children) => {
                children.iter().find_map(FilterExpr::property)
            }
            FilterExpr::Not(inner) => inner.property(),
            FilterExpr::Unsupported(_) => None,
        }
    }
}
