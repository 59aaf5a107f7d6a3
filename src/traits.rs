use crate::{
    extractor::finalize, ColorSpace, Method, MethodOptions, PaletteSize, PixelBuffer,
    QuantizeOutput, UniqueColorCounts,
};
use palette::{cast::ArrayCast, Srgb};

/// Colors that can be viewed as an array of `N` components.
///
/// This is implemented for all `palette` color types, e.g., `Srgb<f32>` and `Lab`.
pub trait ColorComponents<Component, const N: usize>:
    ArrayCast<Array = [Component; N]> + Copy + 'static
{
}

impl<Color, Component, const N: usize> ColorComponents<Component, N> for Color where
    Color: ArrayCast<Array = [Component; N]> + Copy + 'static
{
}

/// A palette extraction strategy.
///
/// Each [`Method`] has exactly one implementor, looked up through [`Method::extractor`].
/// Implementors only need to provide [`Extractor::candidates`]; the provided methods
/// handle images with few distinct colors and turn the candidates into a palette
/// of exactly `min(k, distinct colors)` unique colors ordered by descending count.
pub trait Extractor: Sync {
    /// The method name this extractor is registered under.
    fn method(&self) -> Method;

    /// The color space whose Euclidean distance this extractor groups colors by.
    ///
    /// Statistics use the same space to assign pixels to palette colors.
    fn colorspace(&self, options: &MethodOptions) -> ColorSpace;

    /// Reduces the distinct colors to at most `k` candidate colors with counts.
    ///
    /// This is only called when there are more than `k` distinct colors.
    fn candidates(
        &self,
        colors: &UniqueColorCounts,
        k: PaletteSize,
        options: &MethodOptions,
    ) -> QuantizeOutput<Srgb<u8>>;

    /// Extracts a palette from already deduplicated colors.
    fn extract_counts(
        &self,
        colors: &UniqueColorCounts,
        k: PaletteSize,
        options: &MethodOptions,
    ) -> Vec<Srgb<u8>> {
        if colors.len() <= k.as_usize() {
            colors
                .by_frequency()
                .into_iter()
                .map(|(color, _)| color)
                .collect()
        } else {
            finalize(self.candidates(colors, k, options), colors, k)
        }
    }

    /// Extracts a palette of at most `k` colors from the given pixels.
    fn extract(&self, pixels: &PixelBuffer, k: PaletteSize, options: &MethodOptions) -> Vec<Srgb<u8>> {
        self.extract_counts(&UniqueColorCounts::new(pixels.pixels()), k, options)
    }
}
