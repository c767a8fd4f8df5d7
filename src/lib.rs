//! Translate OGC Styled Layer Descriptor (SLD) documents into the style
//! configuration of a TerriaJS catalog item.
//!
//! ```no_run
//! use sld_terria::{translate, ResourceKind, RendererMode, TranslateOptions};
//!
//! let xml = std::fs::read("LSSCombine.sld").unwrap();
//! let options = TranslateOptions::from_env()
//!     .with_resource_kind(ResourceKind::Vector)
//!     .with_renderer_mode(RendererMode::Discrete);
//! let translation = translate(&xml, &options).unwrap();
//! println!("{}", translation.config.to_json().unwrap());
//! ```

/// `tracing::debug!` that only fires when the per-call debug switch is on.
macro_rules! diag {
    ($enabled:expr, $($arg:tt)+) => {
        if $enabled {
            tracing::debug!($($arg)+);
        }
    };
}

pub mod catalog;
pub mod classifier;
pub mod color;
pub mod emitter;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod options;
pub mod parser;
pub mod translator;

pub use catalog::{CameraBounds, CatalogDocument, CatalogItem};
pub use emitter::{sanitize_style_id, ColorBin, ConfigEmitter, DiscreteColorMap, ResourceConfig};
pub use error::{Result, SldError};
pub use model::{Bound, ColorStop, Range, RuleKind, StyleModel, StyleRule};
pub use normalizer::{continuous_stops, normalize};
pub use options::{RendererMode, ResourceKind, TranslateOptions};
pub use parser::{parse_sld, SldDocument};
pub use translator::{translate, translate_to_json, Translation};
