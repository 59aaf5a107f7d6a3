//! A caller-owned cache of extraction results.

use crate::{extract_colors, ExtractionConfig, ExtractionResult, PixelBuffer, Result};
use palette::cast::AsArrays;
use std::{
    collections::{hash_map::Entry, HashMap},
    hash::{DefaultHasher, Hash, Hasher},
};
use tracing::debug;

/// Memoizes [`extract_colors`] by a fingerprint of the pixels and the configuration.
///
/// The cache is plain owned state: share it between threads by wrapping it in a lock,
/// or keep one per thread.
///
/// # Examples
/// ```
/// # use color_extractor::{ExtractionConfig, PaletteCache, PixelBuffer};
/// # use palette::Srgb;
/// # fn main() -> color_extractor::Result<()> {
/// let pixels = PixelBuffer::new(1, 2, vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)])?;
/// let config = ExtractionConfig::new();
///
/// let mut cache = PaletteCache::new();
/// let first = cache.get_or_extract(&pixels, &config)?.clone();
/// let second = cache.get_or_extract(&pixels, &config)?;
/// assert_eq!(&first, second);
/// assert_eq!(cache.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PaletteCache {
    /// Results keyed by [`fingerprint`].
    entries: HashMap<u64, ExtractionResult>,
}

/// A 64-bit fingerprint of the pixel dimensions, pixel contents and configuration.
fn fingerprint(pixels: &PixelBuffer, config: &ExtractionConfig) -> Result<u64> {
    let mut hasher = DefaultHasher::new();
    pixels.width().hash(&mut hasher);
    pixels.height().hash(&mut hasher);
    pixels.pixels().as_arrays().hash(&mut hasher);
    serde_json::to_string(config)?.hash(&mut hasher);
    Ok(hasher.finish())
}

impl PaletteCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result for these pixels and configuration,
    /// running the extraction on a miss.
    ///
    /// Failed extractions are not cached.
    ///
    /// # Errors
    /// Returns any error of [`extract_colors`].
    pub fn get_or_extract(
        &mut self,
        pixels: &PixelBuffer,
        config: &ExtractionConfig,
    ) -> Result<&ExtractionResult> {
        let key = fingerprint(pixels, config)?;
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                debug!(key, "palette cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => Ok(entry.insert(extract_colors(pixels, config)?)),
        }
    }

    /// The number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every cached result.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{Method, SortKey};
    use palette::Srgb;

    #[test]
    fn hits_and_misses() {
        let pixels = PixelBuffer::new(
            2,
            2,
            vec![Srgb::new(255, 0, 0), Srgb::new(0, 255, 0), Srgb::new(0, 0, 255), Srgb::new(255, 0, 0)],
        )
        .unwrap();
        let config = ExtractionConfig::new().n_colors(2);

        let mut cache = PaletteCache::new();
        assert!(cache.is_empty());

        let first = cache.get_or_extract(&pixels, &config).unwrap().clone();
        assert_eq!(first, extract_colors(&pixels, &config).unwrap());
        assert_eq!(cache.get_or_extract(&pixels, &config).unwrap(), &first);
        assert_eq!(cache.len(), 1);

        let other = config.method(Method::Lab).return_stats(true);
        cache.get_or_extract(&pixels, &other).unwrap();
        assert_eq!(cache.len(), 2);

        let flipped = PixelBuffer::new(4, 1, pixels.pixels().to_vec()).unwrap();
        cache.get_or_extract(&flipped, &config).unwrap();
        assert_eq!(cache.len(), 3);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn errors_are_not_cached() {
        let pixels = PixelBuffer::new(1, 1, vec![Srgb::new(0, 0, 0)]).unwrap();
        let config = ExtractionConfig::new().sort_by(SortKey::Frequency);

        let mut cache = PaletteCache::new();
        assert!(cache.get_or_extract(&pixels, &config).is_err());
        assert!(cache.is_empty());
    }
}
