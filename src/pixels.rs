//! Raw pixel arrays, the canonical [`PixelBuffer`], range normalization and downscaling.

use crate::{ExtractError, Result, MAX_PIXELS};
use image::{imageops, RgbImage};
use num_traits::AsPrimitive;
use palette::{cast::AsArrays, Srgb};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The value range of 8-bit pixel data.
pub const U8_RANGE: (f64, f64) = (0.0, 255.0);

/// The value range of normalized floating point pixel data.
pub const UNIT_RANGE: (f64, f64) = (0.0, 1.0);

/// Raw, row-major pixel samples of shape `height × width × channels`.
///
/// The samples can be of any primitive numeric type and any value range.
/// Supported channel counts are `1` (grayscale), `3` (RGB) and `4` (RGBA).
/// A two dimensional `height × width` array is a single channel array.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray<T> {
    data: Vec<T>,
    height: usize,
    width: usize,
    channels: usize,
}

impl<T> PixelArray<T> {
    /// Creates a new [`PixelArray`] from row-major samples.
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidShape`] if `channels` is not 1, 3 or 4,
    /// or if `data` does not hold exactly `height * width * channels` samples.
    pub fn new(data: Vec<T>, height: usize, width: usize, channels: usize) -> Result<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ExtractError::invalid_shape(format!(
                "unsupported channel count {channels}, expected 1, 3 or 4"
            )));
        }

        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| ExtractError::invalid_shape("dimensions overflow"))?;

        if data.len() != expected {
            return Err(ExtractError::invalid_shape(format!(
                "{} samples for shape {height}x{width}x{channels}",
                data.len()
            )));
        }

        Ok(Self { data, height, width, channels })
    }

    /// Creates a single channel [`PixelArray`] from a `height × width` grid.
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidShape`] if `data` does not hold `height * width` samples.
    pub fn grayscale(data: Vec<T>, height: usize, width: usize) -> Result<Self> {
        Self::new(data, height, width, 1)
    }

    /// The samples in row-major order.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the array, returning its samples.
    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// The number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// The number of channels per pixel.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }
}

/// Validates a range and returns the affine map from `input` onto `output`,
/// clamping into `output`.
fn affine_map(input: (f64, f64), output: (f64, f64)) -> Result<impl Fn(f64) -> f64> {
    for (min, max) in [input, output] {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ExtractError::InvalidRange { min, max });
        }
    }

    let (in_min, in_max) = input;
    let (out_min, out_max) = output;
    let scale = (out_max - out_min) / (in_max - in_min);

    Ok(move |value: f64| {
        if value.is_nan() {
            out_min
        } else {
            (value - in_min).mul_add(scale, out_min).clamp(out_min, out_max)
        }
    })
}

/// Linearly remaps pixel values from `input_range` to `output_range`.
///
/// Results are clamped into `output_range` and `NaN` samples map to its lower bound.
/// The shape of the array is preserved.
///
/// # Errors
/// Returns [`ExtractError::InvalidRange`] if either range has `min >= max`
/// or a non-finite bound.
///
/// # Examples
/// ```
/// # use color_extractor::{normalize_image_array, PixelArray};
/// # fn main() -> color_extractor::Result<()> {
/// let pixels = PixelArray::new(vec![0.0, 0.5, 1.0], 1, 1, 3)?;
/// let scaled = normalize_image_array(&pixels, (0.0, 1.0), (0.0, 255.0))?;
/// assert_eq!(scaled.data(), &[0.0, 127.5, 255.0]);
/// # Ok(())
/// # }
/// ```
pub fn normalize_image_array<T>(
    pixels: &PixelArray<T>,
    input_range: (f64, f64),
    output_range: (f64, f64),
) -> Result<PixelArray<f32>>
where
    T: AsPrimitive<f64>,
{
    let map = affine_map(input_range, output_range)?;

    #[allow(clippy::cast_possible_truncation)]
    let data = pixels.data.iter().map(|v| map(v.as_()) as f32).collect();

    Ok(PixelArray {
        data,
        height: pixels.height,
        width: pixels.width,
        channels: pixels.channels,
    })
}

/// The resampling filter used when downscaling.
///
/// Mirrors [`imageops::FilterType`] so it can be part of a serializable configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    /// Nearest neighbor, introduces no new colors.
    Nearest,
    /// Linear (tent) filter, close to area averaging when downscaling.
    Triangle,
    /// Cubic filter.
    CatmullRom,
    /// Gaussian filter.
    Gaussian,
    /// Lanczos with window 3.
    #[default]
    Lanczos3,
}

impl From<ResizeFilter> for imageops::FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => imageops::FilterType::Nearest,
            ResizeFilter::Triangle => imageops::FilterType::Triangle,
            ResizeFilter::CatmullRom => imageops::FilterType::CatmullRom,
            ResizeFilter::Gaussian => imageops::FilterType::Gaussian,
            ResizeFilter::Lanczos3 => imageops::FilterType::Lanczos3,
        }
    }
}

/// A row-major grid of 8-bit sRGB pixels, the canonical input of the extractors.
///
/// A [`PixelBuffer`] is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Srgb<u8>>,
}

impl PixelBuffer {
    /// Creates a [`PixelBuffer`] from row-major pixels.
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidShape`] if `pixels` does not hold `width * height` colors
    /// or if there are more than [`MAX_PIXELS`] pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<Srgb<u8>>) -> Result<Self> {
        let expected = u64::from(width) * u64::from(height);
        if expected > u64::from(MAX_PIXELS) {
            return Err(ExtractError::invalid_shape(format!(
                "{width}x{height} is above the maximum of {MAX_PIXELS} pixels"
            )));
        }

        if pixels.len() as u64 != expected {
            return Err(ExtractError::invalid_shape(format!(
                "{} pixels for a {width}x{height} image",
                pixels.len()
            )));
        }

        Ok(Self { width, height, pixels })
    }

    /// Creates a [`PixelBuffer`] from interleaved 8-bit RGB bytes.
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidShape`] if `bytes` does not hold `width * height * 3` values.
    pub fn from_rgb8(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 3 != 0 {
            return Err(ExtractError::invalid_shape(format!(
                "{} bytes is not a whole number of RGB pixels",
                bytes.len()
            )));
        }

        let pixels = bytes
            .chunks_exact(3)
            .map(|rgb| Srgb::new(rgb[0], rgb[1], rgb[2]))
            .collect();

        Self::new(width, height, pixels)
    }

    /// Canonicalizes a raw [`PixelArray`] whose values lie in `input_range`.
    ///
    /// Alpha channels are dropped, single channels are broadcast to gray,
    /// and values are mapped onto `0..=255` and rounded to the nearest integer.
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidRange`] for an invalid `input_range`
    /// and [`ExtractError::InvalidShape`] if the array dimensions do not fit in a [`PixelBuffer`].
    pub fn from_array<T>(array: &PixelArray<T>, input_range: (f64, f64)) -> Result<Self>
    where
        T: AsPrimitive<f64>,
    {
        let map = affine_map(input_range, U8_RANGE)?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let to_u8 = |value: T| map(value.as_()).round() as u8;

        let pixels = array
            .data
            .chunks_exact(array.channels)
            .map(|pixel| match *pixel {
                [gray] => {
                    let gray = to_u8(gray);
                    Srgb::new(gray, gray, gray)
                }
                [r, g, b, ..] => Srgb::new(to_u8(r), to_u8(g), to_u8(b)),
                _ => Srgb::new(0, 0, 0),
            })
            .collect();

        let width = u32::try_from(array.width)
            .map_err(|_| ExtractError::invalid_shape("width does not fit in u32"))?;
        let height = u32::try_from(array.height)
            .map_err(|_| ExtractError::invalid_shape("height does not fit in u32"))?;

        Self::new(width, height, pixels)
    }

    /// Decodes an image file through the `image` crate.
    ///
    /// # Errors
    /// Returns [`ExtractError::Image`] if the file cannot be read or decoded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let image = image::open(path)?.into_rgb8();
        Ok(Self::from(&image))
    }

    /// The number of columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The number of rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[Srgb<u8>] {
        &self.pixels
    }

    /// The total number of pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the buffer has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The dimensions after fitting the larger side into `max_dimension`,
    /// or `None` if the image already fits.
    fn fitted_dimensions(&self, max_dimension: u32) -> Option<(u32, u32)> {
        let (width, height) = (self.width, self.height);
        let larger = width.max(height);
        if larger <= max_dimension || max_dimension == 0 {
            return None;
        }

        let ratio = f64::from(max_dimension) / f64::from(larger);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scale = |side: u32| ((f64::from(side) * ratio).round() as u32).clamp(1, max_dimension);

        Some((scale(width), scale(height)))
    }

    /// Returns a resampled copy whose larger side is `max_dimension`,
    /// or `None` if the image already fits. The aspect ratio is preserved.
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidShape`] if the buffer cannot be handed to the resampler.
    pub fn downscale(&self, max_dimension: u32, filter: ResizeFilter) -> Result<Option<Self>> {
        let Some((width, height)) = self.fitted_dimensions(max_dimension) else {
            return Ok(None);
        };

        debug!(
            from_width = self.width,
            from_height = self.height,
            width,
            height,
            ?filter,
            "downscaling pixels"
        );

        let image = RgbImage::try_from(self)?;
        let resized = imageops::resize(&image, width, height, filter.into());
        Ok(Some(Self::from(&resized)))
    }
}

impl From<&RgbImage> for PixelBuffer {
    fn from(image: &RgbImage) -> Self {
        let pixels = image
            .pixels()
            .map(|&image::Rgb(rgb)| Srgb::from(rgb))
            .collect();

        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }
}

impl TryFrom<&PixelBuffer> for RgbImage {
    type Error = ExtractError;

    fn try_from(buffer: &PixelBuffer) -> Result<Self> {
        let bytes = buffer.pixels.as_arrays().concat();
        RgbImage::from_raw(buffer.width, buffer.height, bytes)
            .ok_or_else(|| ExtractError::invalid_shape("pixel buffer does not match its dimensions"))
    }
}
