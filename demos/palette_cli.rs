#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{collections::BTreeMap, path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use color_extractor::{
    extract_colors_batch_par, ColorSpace, ColorStat, ExtractionConfig, KmeansOptions, Method,
    MethodOptions, PaletteSize, SortKey,
};
use serde::Serialize;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, ValueEnum)]
enum CliMethod {
    Kmeans,
    Aggressive,
    Vibrant,
    Lab,
    Multistage,
}

impl From<CliMethod> for Method {
    fn from(value: CliMethod) -> Self {
        match value {
            CliMethod::Kmeans => Method::Kmeans,
            CliMethod::Aggressive => Method::Aggressive,
            CliMethod::Vibrant => Method::Vibrant,
            CliMethod::Lab => Method::Lab,
            CliMethod::Multistage => Method::Multistage,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum CliSortKey {
    SpatialX,
    SpatialY,
    Frequency,
    None,
}

impl From<CliSortKey> for SortKey {
    fn from(value: CliSortKey) -> Self {
        match value {
            CliSortKey::SpatialX => SortKey::SpatialX,
            CliSortKey::SpatialY => SortKey::SpatialY,
            CliSortKey::Frequency => SortKey::Frequency,
            CliSortKey::None => SortKey::None,
        }
    }
}

/// Extracts dominant color palettes from image files.
#[derive(Parser)]
pub struct Options {
    #[arg(short, long, value_enum, default_value = "kmeans")]
    method: CliMethod,

    #[arg(short, default_value_t = PaletteSize::default(), value_parser = parse_palette_size)]
    k: PaletteSize,

    /// Sorting by anything but `none` turns on statistics.
    #[arg(short, long, value_enum, default_value = "none")]
    sort: CliSortKey,

    #[arg(long)]
    stats: bool,

    /// Cluster `kmeans` in CIELAB instead of sRGB.
    #[arg(long)]
    lab: bool,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long)]
    max_dimension: Option<u32>,

    /// Load the configuration from a JSON file instead of the flags above.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON catalog instead of a table.
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,

    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn parse_palette_size(s: &str) -> Result<PaletteSize, String> {
    let value: u16 = s.parse().map_err(|e| format!("{e}"))?;
    match PaletteSize::try_from(value) {
        Ok(size) if value > 0 => Ok(size),
        Ok(_) => Err("palette size must be at least 1".to_owned()),
        Err(e) => Err(format!("{e}")),
    }
}

#[derive(Serialize)]
struct CatalogEntry {
    colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<Vec<ColorStat>>,
}

fn config_from_flags(options: &Options) -> ExtractionConfig {
    let sort_by = SortKey::from(options.sort);
    let colorspace = if options.lab { ColorSpace::Lab } else { ColorSpace::Srgb };

    let mut method_options = MethodOptions::new();
    method_options.kmeans = KmeansOptions::new().seed(options.seed).colorspace(colorspace);

    ExtractionConfig::new()
        .method(options.method.into())
        .n_colors(options.k.into_inner())
        .sort_by(sort_by)
        .return_stats(options.stats || sort_by.needs_stats())
        .max_dimension(options.max_dimension)
        .options(method_options)
}

fn main() -> ExitCode {
    let options = Options::parse();

    let level = if options.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &options.config {
        Some(path) => match ExtractionConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => config_from_flags(&options),
    };

    let time = std::time::Instant::now();
    let results = extract_colors_batch_par(&options.images, &config);
    info!(
        images = options.images.len(),
        millis = time.elapsed().as_millis(),
        "extracted palettes"
    );

    let mut catalog = BTreeMap::new();
    let mut failed = false;

    for (path, result) in options.images.iter().zip(results) {
        let name = path.display().to_string();
        match result {
            Ok(result) => {
                catalog.insert(
                    name,
                    CatalogEntry { colors: result.hex_colors(), stats: result.stats },
                );
            }
            Err(e) => {
                warn!(path = %name, error = %e, "extraction failed");
                eprintln!("{name}: {e}");
                failed = true;
            }
        }
    }

    if options.json {
        match serde_json::to_string_pretty(&catalog) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for (name, entry) in &catalog {
            println!("{name}");
            match &entry.stats {
                Some(stats) => {
                    for stat in stats {
                        println!(
                            "  {}  {:>5.1}%  sat {:.2}  at ({:.2}, {:.2})",
                            stat.hex, stat.percentage, stat.saturation, stat.spatial_x, stat.spatial_y
                        );
                    }
                }
                None => println!("  {}", entry.colors.join(" ")),
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
