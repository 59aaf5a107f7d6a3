//! Per-color coverage statistics.
//!
//! Every pixel is assigned to its nearest palette color, using the same distance as the
//! extractor that produced the palette. No pixel is ever excluded, so the pixel counts
//! of all palette colors add up to the number of pixels.

use crate::{
    api::colorspace::srgb_to_hsv, kmeans::Nearest, rgb_to_hex, ColorSpace, IndexedColorCounts,
    PixelBuffer,
};
use palette::Srgb;
use serde::{Deserialize, Serialize};

/// Statistics for one palette color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStat {
    /// The color as `#RRGGBB`.
    pub hex: String,
    /// The share of pixels assigned to this color, in percent, rounded to one decimal.
    pub percentage: f64,
    /// The HSV saturation of the color in `[0, 1]`.
    pub saturation: f64,
    /// The mean normalized x coordinate of the assigned pixels, in `[0, 1]`.
    ///
    /// `0.5` if no pixel was assigned to this color.
    pub spatial_x: f64,
    /// The mean normalized y coordinate of the assigned pixels, in `[0, 1]`.
    ///
    /// `0.5` if no pixel was assigned to this color.
    pub spatial_y: f64,
    /// The number of pixels assigned to this color.
    pub pixel_count: u32,
}

/// Converts pixel counts to percentages rounded to tenths with the largest-remainder method.
///
/// Each share is floored to a tenth of a percent and the leftover tenths go to the largest
/// remainders, ties to the lower index. The result sums to exactly `100.0` unless every count is zero.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn percentages(counts: &[u32]) -> Vec<f64> {
    const TENTHS: u64 = 1000;

    let total = counts.iter().map(|&c| u64::from(c)).sum::<u64>();
    if total == 0 {
        return vec![0.0; counts.len()];
    }

    let mut tenths = Vec::with_capacity(counts.len());
    let mut remainders = Vec::with_capacity(counts.len());
    for &count in counts {
        let scaled = u64::from(count) * TENTHS;
        tenths.push(scaled / total);
        remainders.push(scaled % total);
    }

    let leftover = TENTHS - tenths.iter().sum::<u64>();
    let mut order = (0..counts.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]).then(a.cmp(&b)));
    for &i in order.iter().take(leftover as usize) {
        tenths[i] += 1;
    }

    tenths.into_iter().map(|t| t as f64 / 10.0).collect()
}

/// Computes one [`ColorStat`] per palette color, in palette order.
///
/// Pixel coordinates are normalized to the pixel centers, so the single column of a
/// one pixel wide image sits at `x = 0.5`.
#[must_use]
pub fn collect(pixels: &PixelBuffer, palette: &[Srgb<u8>], metric: ColorSpace) -> Vec<ColorStat> {
    let k = palette.len();
    let mut counts = vec![0u32; k];
    let mut x_sums = vec![0.0f64; k];
    let mut y_sums = vec![0.0f64; k];

    if k > 0 {
        let indexed = IndexedColorCounts::new(pixels.pixels());
        let centroids = palette.iter().map(|&c| metric.point(c)).collect::<Vec<_>>();
        let nearest = Nearest::new(&centroids);

        let assignments = indexed
            .unique()
            .colors()
            .iter()
            .map(|&color| nearest.nearest(metric.point(color)).0)
            .collect::<Vec<_>>();

        let width = pixels.width().max(1) as usize;
        for (i, &index) in indexed.indices().iter().enumerate() {
            let assigned = assignments[index as usize];
            #[allow(clippy::cast_precision_loss)]
            {
                x_sums[assigned] += (i % width) as f64 + 0.5;
                y_sums[assigned] += (i / width) as f64 + 0.5;
            }
            counts[assigned] += 1;
        }
    }

    let percentages = percentages(&counts);
    let width = f64::from(pixels.width().max(1));
    let height = f64::from(pixels.height().max(1));

    palette
        .iter()
        .zip(counts.into_iter().zip(percentages))
        .zip(x_sums.into_iter().zip(y_sums))
        .map(|((&color, (count, percentage)), (x_sum, y_sum))| {
            let (spatial_x, spatial_y) = if count == 0 {
                (0.5, 0.5)
            } else {
                let n = f64::from(count);
                (x_sum / n / width, y_sum / n / height)
            };

            ColorStat {
                hex: rgb_to_hex(color),
                percentage,
                saturation: f64::from(srgb_to_hsv(color).saturation),
                spatial_x,
                spatial_y,
                pixel_count: count,
            }
        })
        .collect()
}
