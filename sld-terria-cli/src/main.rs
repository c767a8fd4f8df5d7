use anyhow::{Context, Result};
use clap::Parser;
use rayon::ThreadPoolBuilder;
use sld_terria::catalog::{CameraBounds, CatalogDocument, CatalogItem};
use sld_terria::options::debug_from_env;
use sld_terria::{translate, RendererMode, ResourceKind, TranslateOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input SLD file, or a directory searched recursively for .sld/.xml files
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory (single files print to stdout when omitted)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Target resource kind: raster, vector or csv
    #[arg(short, long, conflicts_with = "format")]
    kind: Option<ResourceKind>,

    /// CKAN resource format (shp, tif, geotiff, csv, ...) used to pick the kind
    #[arg(short, long)]
    format: Option<String>,

    /// Renderer mode: discrete or continuous
    #[arg(short, long, default_value = "discrete")]
    mode: RendererMode,

    /// Verbose translator diagnostics (also enabled by TERRIA_DEBUG)
    #[arg(long)]
    debug: bool,

    /// Number of worker threads for directory input (default: CPU cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Wrap the style in a complete TerriaJS init document
    #[arg(long)]
    catalog: bool,

    /// Catalog item name (default: input file stem)
    #[arg(long, requires = "catalog")]
    name: Option<String>,

    /// Resource URL for the catalog item
    #[arg(long, requires = "catalog")]
    url: Option<String>,

    /// Camera bounds as north,east,south,west
    #[arg(long, requires = "catalog", conflicts_with = "spatial", allow_hyphen_values = true)]
    bounds: Option<CameraBounds>,

    /// Dataset `spatial` GeoJSON polygon to take camera bounds from
    #[arg(long, requires = "catalog")]
    spatial: Option<String>,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn options(&self) -> Result<TranslateOptions> {
        let kind = match (&self.kind, &self.format) {
            (Some(kind), _) => *kind,
            (None, Some(format)) => ResourceKind::from_format(format)?,
            (None, None) => ResourceKind::default(),
        };

        Ok(TranslateOptions::from_env()
            .with_resource_kind(kind)
            .with_renderer_mode(self.mode)
            .with_debug(self.debug || debug_from_env()))
    }

    fn camera_bounds(&self) -> CameraBounds {
        match (&self.bounds, &self.spatial) {
            (Some(bounds), _) => *bounds,
            (None, Some(spatial)) => CameraBounds::from_spatial(spatial),
            (None, None) => CameraBounds::default(),
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let level = if args.debug || debug_from_env() {
        Level::DEBUG
    } else {
        Level::INFO
    };
    // stdout carries the JSON
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Record start time
    let start_time = std::time::Instant::now();

    // Configure the thread pool
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    // Resolve translation options
    let options = args.options()?;
    info!(
        "Translating for {} ({})",
        options.resource_kind, options.renderer_mode
    );

    // Dispatch on the input path
    if args.input.is_file() {
        process_file(&args.input, &args, &options)?;
    } else if args.input.is_dir() {
        info!("Processing directory: {:?}", args.input);
        process_directory(&args.input, &args, &options)?;
    } else {
        error!("Invalid input path: {:?}", args.input);
        anyhow::bail!("Input path must be a file or directory");
    }

    // Report processing time
    info!("Total processing time: {:?}", start_time.elapsed());

    Ok(())
}

fn process_file(path: &Path, args: &Args, options: &TranslateOptions) -> Result<()> {
    let json = render(path, args, options)?;

    // Write into the output directory, or print
    match &args.output {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {:?}", dir))?;
            let output_path = dir.join(output_name(path));
            write_output(&output_path, &json)?;
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn process_directory(dir: &Path, args: &Args, options: &TranslateOptions) -> Result<()> {
    use rayon::prelude::*;

    let output_dir = args
        .output
        .as_ref()
        .context("--output is required when the input is a directory")?;

    // Collect SLD files recursively
    let input_files = collect_sld_files(dir)?;
    info!("Found {} SLD files", input_files.len());

    // Translate files in parallel, mirroring the input layout
    let results: Vec<Result<()>> = input_files
        .par_iter()
        .map(|path| {
            let json = render(path, args, options)?;
            let relative = path.strip_prefix(dir).unwrap_or(path.as_path());
            let output_path = output_dir.join(relative).with_extension("json");
            write_output(&output_path, &json)
        })
        .collect();

    // Check for errors
    let mut errors = Vec::new();
    for (path, result) in input_files.iter().zip(results) {
        if let Err(e) = result {
            errors.push(format!("{}: {:#}", path.display(), e));
        }
    }

    if !errors.is_empty() {
        error!("Failed to process {} files:", errors.len());
        for err in &errors {
            error!("  {}", err);
        }
        anyhow::bail!("{} files failed to process", errors.len());
    }

    Ok(())
}

/// Translate one document into the JSON text to write.
fn render(path: &Path, args: &Args, options: &TranslateOptions) -> Result<String> {
    let xml = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let translation =
        translate(&xml, options).with_context(|| format!("Failed to translate {:?}", path))?;

    for defect in &translation.defects {
        warn!("{}: {}", path.display(), defect);
    }
    info!(
        "Translated {:?}: {} legend entries",
        path,
        translation.model.len()
    );

    // Wrap in a catalog document when asked
    let json = if args.catalog {
        let name = args.name.clone().unwrap_or_else(|| file_stem(path));
        let item = CatalogItem::with_style(&name, args.url.as_deref().unwrap_or(""), translation.config);
        let document = CatalogDocument::single(item, args.camera_bounds());
        if args.pretty {
            document.to_json_pretty()?
        } else {
            document.to_json()?
        }
    } else if args.pretty {
        translation.config.to_json_pretty()?
    } else {
        translation.config.to_json()?
    };

    Ok(json)
}

fn write_output(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    info!("Written: {:?}", path);
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("style")
        .to_string()
}

fn output_name(path: &Path) -> String {
    format!("{}.json", file_stem(path))
}

fn is_sld_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref(),
        Some("sld") | Some("xml")
    )
}

fn collect_sld_files(dir: &Path) -> Result<Vec<PathBuf>> {
    use rayon::prelude::*;

    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {:?}", dir))?
        .collect::<std::io::Result<Vec<_>>>()?;

    // Walk entries in parallel
    let nested = entries
        .into_par_iter()
        .map(|entry| -> Result<Vec<PathBuf>> {
            let path = entry.path();
            if path.is_dir() {
                // Recurse into subdirectories
                collect_sld_files(&path)
            } else if is_sld_file(&path) {
                Ok(vec![path])
            } else {
                Ok(Vec::new())
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let mut files: Vec<PathBuf> = nested.into_iter().flatten().collect();
    files.sort();
    Ok(files)
}
