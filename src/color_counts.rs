//! Contains the code for color/pixel deduplication.
//!
//! Colors are packed into `u32` keys (`0x00RRGGBB`) and sorted,
//! so the unique colors always come out in ascending `(r, g, b)` order.

use palette::Srgb;
use std::cmp::Reverse;

/// Packs a color into a `u32` key that sorts like its `(r, g, b)` components.
#[inline]
pub(crate) fn color_key(color: Srgb<u8>) -> u32 {
    u32::from_be_bytes([0, color.red, color.green, color.blue])
}

/// The inverse of [`color_key`].
#[inline]
pub(crate) fn key_color(key: u32) -> Srgb<u8> {
    let [_, r, g, b] = key.to_be_bytes();
    Srgb::new(r, g, b)
}

/// Deduplicated colors and their frequency counts.
///
/// The extractors operate on these weighted distinct colors instead of raw pixels,
/// which also makes "number of distinct colors" a cheap query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UniqueColorCounts {
    /// The unique colors in ascending component order.
    colors: Vec<Srgb<u8>>,
    /// The number of times each color was present in the original pixels.
    counts: Vec<u32>,
    /// The total number of original pixels.
    total_count: u32,
}

impl UniqueColorCounts {
    /// Deduplicates the given pixels.
    #[must_use]
    pub fn new(pixels: &[Srgb<u8>]) -> Self {
        let mut keys = pixels.iter().copied().map(color_key).collect::<Vec<_>>();
        keys.sort_unstable();
        Self::from_sorted_keys(&keys)
    }

    /// Run-length encodes an already sorted key slice.
    fn from_sorted_keys(keys: &[u32]) -> Self {
        let mut colors = Vec::new();
        let mut counts: Vec<u32> = Vec::new();

        for chunk in keys.chunk_by(|a, b| a == b) {
            colors.push(key_color(chunk[0]));
            #[allow(clippy::cast_possible_truncation)]
            counts.push(chunk.len() as u32);
        }

        #[allow(clippy::cast_possible_truncation)]
        let total_count = keys.len() as u32;

        Self { colors, counts, total_count }
    }

    /// Returns the slice of unique colors.
    #[must_use]
    pub fn colors(&self) -> &[Srgb<u8>] {
        &self.colors
    }

    /// Returns a slice for the number of times each unique color was present in the original pixels.
    #[must_use]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Returns the number of original pixels.
    ///
    /// This is equal to the sum of [`UniqueColorCounts::counts`].
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    /// Returns the number of unique colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether there are no colors at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The unique colors paired with their counts, most frequent first.
    ///
    /// Ties keep ascending component order.
    #[must_use]
    pub fn by_frequency(&self) -> Vec<(Srgb<u8>, u32)> {
        let mut pairs = self
            .colors
            .iter()
            .copied()
            .zip(self.counts.iter().copied())
            .collect::<Vec<_>>();
        pairs.sort_by_key(|&(_, count)| Reverse(count));
        pairs
    }

    /// Converts every unique color, e.g., into another color space.
    pub fn convert<Color>(&self, convert_color: impl Fn(Srgb<u8>) -> Color) -> Vec<Color> {
        self.colors.iter().copied().map(convert_color).collect()
    }
}

/// Deduplicated colors that also remember which unique color each pixel was.
///
/// This retains the pixel layout, which the statistics need for spatial positions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexedColorCounts {
    /// The unique colors and their counts.
    unique: UniqueColorCounts,
    /// For each original pixel, an index into the unique colors.
    indices: Vec<u32>,
}

impl IndexedColorCounts {
    /// Deduplicates the given pixels, keeping a per-pixel index.
    #[must_use]
    pub fn new(pixels: &[Srgb<u8>]) -> Self {
        let pixel_keys = pixels.iter().copied().map(color_key).collect::<Vec<_>>();

        let mut keys = pixel_keys.clone();
        keys.sort_unstable();
        let unique = UniqueColorCounts::from_sorted_keys(&keys);

        let unique_keys = unique.colors.iter().copied().map(color_key).collect::<Vec<_>>();
        let indices = pixel_keys
            .iter()
            .map(|key| {
                let (Ok(i) | Err(i)) = unique_keys.binary_search(key);
                #[allow(clippy::cast_possible_truncation)]
                {
                    i as u32
                }
            })
            .collect();

        Self { unique, indices }
    }

    /// The unique colors and their counts.
    #[must_use]
    pub fn unique(&self) -> &UniqueColorCounts {
        &self.unique
    }

    /// For each original pixel, the index of its color in [`IndexedColorCounts::unique`].
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use rand::{seq::SliceRandom, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    fn assert_valid_unique(unique: &UniqueColorCounts, pixels: &[Srgb<u8>]) {
        assert_eq!(unique.total_count() as usize, pixels.len());
        assert_eq!(unique.counts().iter().sum::<u32>(), unique.total_count());

        let colors = unique.colors();
        for i in 1..colors.len() {
            assert!(colors[i - 1].into_components() < colors[i].into_components());
        }
    }

    #[test]
    fn empty_input() {
        let unique = UniqueColorCounts::new(&[]);
        assert!(unique.is_empty() && unique.colors().is_empty() && unique.counts().is_empty());
        assert_eq!(unique.total_count(), 0);

        let indexed = IndexedColorCounts::new(&[]);
        assert!(indexed.unique().is_empty() && indexed.indices().is_empty());
    }

    #[test]
    fn key_round_trip() {
        for color in test_colors_1024() {
            assert_eq!(key_color(color_key(color)), color);
        }
    }

    #[test]
    fn counts_duplicates() {
        let red = Srgb::new(255, 0, 0);
        let blue = Srgb::new(0, 0, 255);
        let pixels = [red, blue, red, red];

        let unique = UniqueColorCounts::new(&pixels);
        assert_valid_unique(&unique, &pixels);
        assert_eq!(unique.colors(), &[blue, red]);
        assert_eq!(unique.counts(), &[1, 3]);
        assert_eq!(unique.by_frequency(), vec![(red, 3), (blue, 1)]);
    }

    #[test]
    fn reordered_input() {
        let colors = [test_colors_1024().as_slice(); 3].concat();
        let mut reordered = colors.clone();
        reordered.shuffle(&mut Xoroshiro128PlusPlus::seed_from_u64(0));

        let expected = UniqueColorCounts::new(&colors);
        let actual = UniqueColorCounts::new(&reordered);
        assert_valid_unique(&actual, &reordered);
        assert_eq!(actual, expected);
    }

    #[test]
    fn indexed_points_back_to_pixels() {
        let pixels = test_colors_1024();
        let indexed = IndexedColorCounts::new(&pixels);
        assert_valid_unique(indexed.unique(), &pixels);

        let colors = indexed.unique().colors();
        for (&i, &pixel) in indexed.indices().iter().zip(&pixels) {
            assert_eq!(colors[i as usize], pixel);
        }
    }
}
