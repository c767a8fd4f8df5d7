use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use sld_terria::catalog::{CameraBounds, CatalogDocument, CatalogItem};
use sld_terria::options::debug_from_env;
use sld_terria::{RendererMode, ResourceKind, SldError, TranslateOptions, Translation};

#[pymodule]
#[pyo3(name = "sld_terria")]
fn sld_terria_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(translate, m)?)?;
    m.add_function(wrap_pyfunction!(translate_file, m)?)?;
    m.add_function(wrap_pyfunction!(translate_with_defects, m)?)?;
    m.add_function(wrap_pyfunction!(catalog_config, m)?)?;
    m.add_function(wrap_pyfunction!(resource_kind_for_format, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_color, m)?)?;
    Ok(())
}

fn value_error(e: SldError) -> PyErr {
    PyErr::new::<PyValueError, _>(e.to_string())
}

/// `debug=None` defers to `TERRIA_DEBUG`, read at call time.
fn options(kind: &str, mode: &str, debug: Option<bool>) -> PyResult<TranslateOptions> {
    let kind: ResourceKind = kind.parse().map_err(value_error)?;
    let mode: RendererMode = mode.parse().map_err(value_error)?;
    Ok(TranslateOptions::new(kind, mode).with_debug(debug.unwrap_or_else(debug_from_env)))
}

fn run(xml: &[u8], options: &TranslateOptions) -> PyResult<Translation> {
    sld_terria::translate(xml, options).map_err(value_error)
}

fn config_json(translation: &Translation) -> PyResult<String> {
    translation
        .config
        .to_json()
        .map_err(|e| PyErr::new::<PyValueError, _>(format!("Failed to serialize config: {}", e)))
}

/// Translate SLD bytes to the TerriaJS style JSON for one resource.
#[pyfunction]
#[pyo3(signature = (xml, kind="vector", mode="discrete", debug=None))]
pub fn translate(xml: &[u8], kind: &str, mode: &str, debug: Option<bool>) -> PyResult<String> {
    let options = options(kind, mode, debug)?;
    config_json(&run(xml, &options)?)
}

#[pyfunction]
#[pyo3(signature = (path, kind="vector", mode="discrete", debug=None))]
pub fn translate_file(path: &str, kind: &str, mode: &str, debug: Option<bool>) -> PyResult<String> {
    let xml = std::fs::read(path).map_err(|e| {
        PyErr::new::<PyIOError, _>(format!("Failed to read file: {}", e))
    })?;
    translate(&xml, kind, mode, debug)
}

/// Like `translate`, also returning the recovered rule-level defects as messages.
#[pyfunction]
#[pyo3(signature = (xml, kind="vector", mode="discrete", debug=None))]
pub fn translate_with_defects(
    xml: &[u8],
    kind: &str,
    mode: &str,
    debug: Option<bool>,
) -> PyResult<(String, Vec<String>)> {
    let options = options(kind, mode, debug)?;
    let translation = run(xml, &options)?;
    let defects = translation.defects.iter().map(|d| d.to_string()).collect();
    Ok((config_json(&translation)?, defects))
}

/// Full TerriaJS init document for a CKAN resource.
///
/// `format` is the CKAN resource format; `spatial` the dataset's GeoJSON extent.
#[pyfunction]
#[pyo3(signature = (xml, format, name, url, spatial=None, mode="discrete", debug=None))]
pub fn catalog_config(
    xml: &[u8],
    format: &str,
    name: &str,
    url: &str,
    spatial: Option<&str>,
    mode: &str,
    debug: Option<bool>,
) -> PyResult<String> {
    let kind = ResourceKind::from_format(format).map_err(value_error)?;
    let options = options(&kind.to_string(), mode, debug)?;
    let translation = run(xml, &options)?;

    let bounds = spatial.map_or_else(CameraBounds::default, CameraBounds::from_spatial);
    let item = CatalogItem::with_style(name, url, translation.config);
    CatalogDocument::single(item, bounds)
        .to_json()
        .map_err(value_error)
}

/// `"raster"`, `"vector"` or `"csv"`; ValueError for unsupported formats.
#[pyfunction]
pub fn resource_kind_for_format(format: &str) -> PyResult<String> {
    ResourceKind::from_format(format)
        .map(|k| k.to_string())
        .map_err(value_error)
}

#[pyfunction]
pub fn normalize_color(color: &str) -> Option<String> {
    sld_terria::color::normalize_color(color)
}
