//! Contains the configuration types and the high level extraction entry points.

mod cache;
pub(crate) mod colorspace;
mod config;
mod options;

pub use cache::PaletteCache;
pub use colorspace::ColorSpace;
pub use config::{ExtractionConfig, Method};
pub use options::{
    AggressiveOptions, KmeansOptions, MethodOptions, MultistageOptions, VibrantOptions,
};

use crate::{
    sort, stats, ExtractError, ExtractionResult, PixelArray, PixelBuffer, Result,
    UniqueColorCounts,
};
use num_traits::AsPrimitive;
use std::{borrow::Cow, path::Path};
use tracing::debug;

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Extracts a palette (and optionally per-color statistics) from a pixel buffer.
///
/// The configuration is validated first. The buffer is then downscaled if it exceeds
/// [`ExtractionConfig::max_dimension`], deduplicated, and handed to the configured [`Method`].
/// The returned colors are unique and there are `min(n_colors, distinct colors)` of them.
///
/// # Errors
/// Returns [`ExtractError::Configuration`] for invalid parameters and
/// [`ExtractError::MissingStats`] when sorting by a key that needs statistics
/// without [`ExtractionConfig::return_stats`]. Nothing is computed in either case.
///
/// # Examples
/// ```
/// # use color_extractor::{extract_colors, ExtractionConfig, PixelBuffer, SortKey};
/// # use palette::Srgb;
/// # fn main() -> color_extractor::Result<()> {
/// let red = Srgb::new(255, 0, 0);
/// let green = Srgb::new(0, 255, 0);
/// let pixels = PixelBuffer::new(2, 2, vec![red, green, red, green])?;
///
/// let config = ExtractionConfig::new()
///     .n_colors(2)
///     .return_stats(true)
///     .sort_by(SortKey::SpatialX);
///
/// let result = extract_colors(&pixels, &config)?;
/// assert_eq!(result.hex_colors(), ["#FF0000", "#00FF00"]);
/// assert_eq!(result.dominant().map(|stat| stat.percentage), Some(50.0));
/// # Ok(())
/// # }
/// ```
pub fn extract_colors(pixels: &PixelBuffer, config: &ExtractionConfig) -> Result<ExtractionResult> {
    let k = config.validate()?;

    if config.sort_by.needs_stats() && !config.return_stats {
        return Err(ExtractError::MissingStats { sort_by: config.sort_by });
    }

    let pixels = match config.max_dimension {
        Some(max_dimension) => pixels
            .downscale(max_dimension, config.resize_filter)?
            .map_or(Cow::Borrowed(pixels), Cow::Owned),
        None => Cow::Borrowed(pixels),
    };

    let colors = UniqueColorCounts::new(pixels.pixels());
    let extractor = config.method.extractor();

    debug!(
        method = %config.method,
        n_colors = k.into_inner(),
        pixels = pixels.len(),
        distinct = colors.len(),
        "extracting palette"
    );

    let palette = extractor.extract_counts(&colors, k, &config.options);

    let stats = config.return_stats.then(|| {
        stats::collect(&pixels, &palette, extractor.colorspace(&config.options))
    });

    let (colors, stats) = sort::sort(palette, stats, config.sort_by)?;
    Ok(ExtractionResult { colors, stats })
}

/// Extracts a palette from raw pixel samples whose values lie in `input_range`.
///
/// Use `(0.0, 255.0)` for 8-bit data and `(0.0, 1.0)` for normalized floats.
///
/// # Errors
/// Returns [`ExtractError::InvalidRange`] for an invalid `input_range`,
/// [`ExtractError::InvalidShape`] if the array does not fit in a [`PixelBuffer`],
/// and any error of [`extract_colors`].
pub fn extract_colors_from_array<T>(
    pixels: &PixelArray<T>,
    input_range: (f64, f64),
    config: &ExtractionConfig,
) -> Result<ExtractionResult>
where
    T: AsPrimitive<f64>,
{
    extract_colors(&PixelBuffer::from_array(pixels, input_range)?, config)
}

/// Decodes an image file and extracts its palette.
///
/// # Errors
/// Returns [`ExtractError::Image`] if the file cannot be read or decoded
/// and any error of [`extract_colors`].
pub fn extract_colors_from_path(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult> {
    let path = path.as_ref();
    debug!(path = %path.display(), "decoding image");
    extract_colors(&PixelBuffer::open(path)?, config)
}

/// Extracts the palette of each image file with the same configuration, one after another.
///
/// Each image gets its own result, so one unreadable file does not affect the others.
#[must_use]
pub fn extract_colors_batch<P>(paths: &[P], config: &ExtractionConfig) -> Vec<Result<ExtractionResult>>
where
    P: AsRef<Path>,
{
    paths
        .iter()
        .map(|path| extract_colors_from_path(path, config))
        .collect()
}

/// Extracts the palette of each image file in parallel using [`rayon`].
///
/// Results are in the order of `paths` and equal those of [`extract_colors_batch`].
#[cfg(feature = "threads")]
#[must_use]
pub fn extract_colors_batch_par<P>(
    paths: &[P],
    config: &ExtractionConfig,
) -> Vec<Result<ExtractionResult>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| extract_colors_from_path(path, config))
        .collect()
}
