//! Parse, classify, normalise and emit in one synchronous call.

use crate::classifier::classify_document;
use crate::emitter::{ConfigEmitter, ResourceConfig};
use crate::error::{Result, SldError};
use crate::model::StyleModel;
use crate::normalizer::normalize;
use crate::options::{RendererMode, ResourceKind, TranslateOptions};
use crate::parser::{parse_sld, SldDocument};

/// Result of one translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub config: ResourceConfig,
    pub model: StyleModel,
    pub document: SldDocument,
    /// Rule-level defects that were recovered from, in rule order.
    pub defects: Vec<SldError>,
}

/// Translate SLD bytes into a TerriaJS style configuration.
///
/// # Errors
///
/// Only document-level failures are returned ([`SldError::MalformedDocument`]).
/// Rule-level problems end up in [`Translation::defects`].
pub fn translate(xml: &[u8], options: &TranslateOptions) -> Result<Translation> {
    let debug = options.debug;

    let document = parse_sld(xml).inspect_err(|e| {
        diag!(debug, "SLD parse failed: {}", e);
    })?;
    diag!(
        debug,
        "parsed SLD version {:?}, layer {:?}, {} rules",
        document.version,
        document.layer_name,
        document.rules.len()
    );

    let classified = classify_document(&document, debug);
    let model = normalize(classified.rules);
    diag!(
        debug,
        "normalized to {} legend entries, property {:?}",
        model.len(),
        model.property()
    );

    let config = ConfigEmitter::new(options).emit(&model, options.resource_kind, options.renderer_mode);

    Ok(Translation {
        config,
        model,
        document,
        defects: classified.defects,
    })
}

/// Translate with kind and mode given by name, returning compact JSON.
///
/// # Errors
///
/// Unknown kind or mode names, and malformed documents.
pub fn translate_to_json(xml: &[u8], kind: &str, mode: &str, debug: bool) -> Result<String> {
    let kind: ResourceKind = kind.parse()?;
    let mode: RendererMode = mode.parse()?;
    let options = TranslateOptions::new(kind, mode).with_debug(debug);

    let translation = translate(xml, &options)?;
    translation
        .config
        .to_json()
        .map_err(|e| SldError::MalformedDocument(format!("JSON serialization failed: {}", e)))
}
