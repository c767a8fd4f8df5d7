use thiserror::Error;

pub type Result<T> = std::result::Result<T, SldError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SldError {
    /// Not well-formed XML, or no `FeatureTypeStyle`/`Rule` to translate.
    #[error("Malformed SLD document: {0}")]
    MalformedDocument(String),

    /// Rule-level: no usable fill or stroke colour. Recovered with the default colour.
    #[error("Rule {rule}: no fill or stroke colour found")]
    MissingColor { rule: usize },

    /// Rule-level: a numeric bound was expected. Recovered by demoting the rule to a catch-all.
    #[error("Rule {rule}: invalid numeric literal '{literal}'")]
    InvalidLiteral { rule: usize, literal: String },

    #[error("Unsupported resource kind: {0}")]
    UnsupportedResourceKind(String),

    #[error("Unsupported renderer mode: {0}")]
    UnsupportedRendererMode(String),
}

impl SldError {
    /// Whether the error aborts a whole translation or only degrades one rule.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SldError::MissingColor { .. } | SldError::InvalidLiteral { .. }
        )
    }
}

impl From<quick_xml::Error> for SldError {
    fn from(e: quick_xml::Error) -> Self {
        SldError::MalformedDocument(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SldError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        SldError::MalformedDocument(e.to_string())
    }
}
