//! A library for extracting dominant color palettes from images.
//!
//! `color_extractor` turns pixels into a small set of representative colors using one of five
//! methods (see [`Method`]), optionally with per-color statistics
//! (coverage, saturation and where in the image a color sits) and a spatial or frequency ordering.
//!
//! # Features
//! `color_extractor` has two `cargo` features, both enabled by default:
//! - `threads`: exposes [`extract_colors_batch_par`] via [`rayon`].
//! - `formats`: enables decoding of png, jpeg, gif and bmp files through the [`image`] crate
//!   for [`extract_colors_from_path`].
//!
//! # High-Level API
//! To get started, see [`extract_colors`] and [`ExtractionConfig`]:
//! ```no_run
//! # use color_extractor::{extract_colors_from_path, ExtractionConfig, Method, SortKey};
//! # fn main() -> color_extractor::Result<()> {
//! let config = ExtractionConfig::new()
//!     .method(Method::Lab) // cluster by perceptual distance
//!     .n_colors(6)
//!     .return_stats(true)
//!     .sort_by(SortKey::SpatialX) // left to right
//!     .max_dimension(Some(512)); // downscale large images first
//!
//! let result = extract_colors_from_path("some image", &config)?;
//! for (hex, stat) in result.hex_colors().iter().zip(result.stats.iter().flatten()) {
//!     println!("{hex} {:>5.1}%", stat.percentage);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Results are deterministic: the same pixels and configuration always give the same palette.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod api;
mod color_counts;
mod error;
mod extractor;
mod format;
mod pixels;
mod traits;
mod types;

pub mod kmeans;
pub mod quantize;
pub mod sort;
pub mod stats;

pub use api::*;
pub use color_counts::*;
pub use error::*;
pub use extractor::{
    AggressiveExtractor, KmeansExtractor, LabExtractor, MultistageExtractor, VibrantExtractor,
};
pub use format::*;
pub use pixels::*;
pub use sort::SortKey;
pub use stats::ColorStat;
pub use traits::*;
pub use types::*;

/// The maximum supported image size in number of pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The maximum supported number of palette colors is `256`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;
