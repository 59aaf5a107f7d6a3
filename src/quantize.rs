//! Uniform color quantization: grouping colors into bins by the high bits of each channel.

use crate::{color_counts::color_key, UniqueColorCounts};
use palette::Srgb;

/// A group of colors sharing the same high bits in every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin {
    /// Count weighted component sums.
    sums: [u64; 3],
    /// The number of pixels in the bin.
    count: u32,
}

impl Bin {
    /// The number of pixels in this bin.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The count weighted mean color, rounded to the nearest integer per channel.
    #[must_use]
    pub fn mean_u8(&self) -> Srgb<u8> {
        let count = f64::from(self.count.max(1));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let [r, g, b] = self.sums.map(|s| (s as f64 / count).round() as u8);
        Srgb::new(r, g, b)
    }

    /// The count weighted mean color with components in `[0, 1]`.
    #[must_use]
    pub fn mean_f32(&self) -> Srgb<f32> {
        let count = f64::from(self.count.max(1)) * 255.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let [r, g, b] = self.sums.map(|s| (s as f64 / count) as f32);
        Srgb::new(r, g, b)
    }
}

/// The bin key of a color: the top `bits` of each channel.
#[inline]
fn bin_key(color: Srgb<u8>, bits: u8) -> u32 {
    let shift = 8 - u32::from(bits);
    let [r, g, b] = [color.red, color.green, color.blue].map(|c| u32::from(c) >> shift);
    (r << (2 * bits)) | (g << bits) | b
}

/// Groups the unique colors into bins keyed by the top `bits` of each channel.
///
/// `bits` must be in `1..=8`. Empty bins are omitted and the bins are ordered by key.
#[must_use]
pub fn bins(colors: &UniqueColorCounts, bits: u8) -> Vec<Bin> {
    debug_assert!((1..=8).contains(&bits));

    let mut keyed = colors
        .colors()
        .iter()
        .zip(colors.counts())
        .map(|(&color, &count)| (bin_key(color, bits), color, count))
        .collect::<Vec<_>>();

    keyed.sort_by_key(|&(key, color, _)| (key, color_key(color)));

    keyed
        .chunk_by(|a, b| a.0 == b.0)
        .map(|group| {
            let mut sums = [0u64; 3];
            let mut count = 0;
            for &(_, color, n) in group {
                for (sum, c) in sums.iter_mut().zip([color.red, color.green, color.blue]) {
                    *sum += u64::from(c) * u64::from(n);
                }
                count += n;
            }
            Bin { sums, count }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn merges_neighbors() {
        let mut pixels = vec![Srgb::new(250, 0, 0); 30];
        pixels.extend([Srgb::new(255, 5, 5); 20]);
        pixels.extend([Srgb::new(0, 0, 255); 40]);

        let bins = bins(&UniqueColorCounts::new(&pixels), 3);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].mean_u8(), Srgb::new(0, 0, 255));
        assert_eq!(bins[0].count(), 40);
        assert_eq!(bins[1].mean_u8(), Srgb::new(252, 2, 2));
        assert_eq!(bins[1].count(), 50);
    }

    #[test]
    fn eight_bits_is_identity() {
        let colors = UniqueColorCounts::new(&test_colors_1024());
        let bins = bins(&colors, 8);
        assert_eq!(bins.len(), colors.len());
        for (bin, &color) in bins.iter().zip(colors.colors()) {
            assert_eq!(bin.mean_u8(), color);
        }
    }

    #[test]
    fn counts_are_preserved() {
        let colors = UniqueColorCounts::new(&test_colors_1024());
        for bits in 1..=8 {
            let bins = bins(&colors, bits);
            assert!(bins.len() <= 1 << (3 * bits));
            assert_eq!(bins.iter().map(Bin::count).sum::<u32>(), colors.total_count());
        }
    }

    #[test]
    fn float_mean() {
        let bins = bins(&UniqueColorCounts::new(&[Srgb::new(255, 0, 51)]), 5);
        let mean = bins[0].mean_f32();
        assert!((mean.red - 1.0).abs() < 1e-6);
        assert!((mean.blue - 0.2).abs() < 1e-6);
    }
}
