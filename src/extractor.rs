//! The five palette extraction strategies.
//!
//! Each strategy is a unit struct implementing [`Extractor`] and is registered in a static table
//! indexed by [`Method`], so looking up an extractor never allocates.
//!
//! All strategies produce candidates, which [`finalize`] turns into a palette of
//! `min(k, distinct colors)` unique colors ordered by descending count.

use crate::{
    api::colorspace::{from_srgb, from_srgb_f32, srgb_from_f32, srgb_to_f32, srgb_to_hsv, to_srgb},
    kmeans, quantize, ColorSpace, Extractor, KmeansOptions, Method, MethodOptions, PaletteSize,
    QuantizeOutput, UniqueColorCounts,
};
use palette::{Lab, Srgb};
use std::cmp::Reverse;
use tracing::debug;

/// The extractor of each [`Method`], in the order of [`Method::ALL`].
pub(crate) static EXTRACTORS: [&dyn Extractor; 5] = [
    &KmeansExtractor,
    &AggressiveExtractor,
    &VibrantExtractor,
    &LabExtractor,
    &MultistageExtractor,
];

/// Runs weighted k-means on 8-bit colors in the given color space.
fn kmeans_in(
    colorspace: ColorSpace,
    colors: &[Srgb<u8>],
    weights: &[u32],
    k: PaletteSize,
    options: &KmeansOptions,
) -> QuantizeOutput<Srgb<u8>> {
    match colorspace {
        ColorSpace::Srgb => {
            let points = colors.iter().copied().map(srgb_to_f32).collect::<Vec<_>>();
            kmeans::palette(&points, weights, k, options).map_palette(srgb_from_f32)
        }
        ColorSpace::Lab => {
            let points = colors
                .iter()
                .map(|&color| from_srgb::<_, Lab>(color))
                .collect::<Vec<_>>();
            kmeans::palette(&points, weights, k, options).map_palette(|lab| to_srgb(lab))
        }
    }
}

/// Turns candidates into the final palette.
///
/// Exact duplicates are merged (summing their counts), zero count candidates are dropped,
/// and the rest are ordered by descending count (ties keep candidate order) and truncated to `k`.
/// If fewer than `min(k, distinct colors)` remain, the most frequent distinct colors
/// not yet in the palette are appended.
pub(crate) fn finalize(
    candidates: QuantizeOutput<Srgb<u8>>,
    colors: &UniqueColorCounts,
    k: PaletteSize,
) -> Vec<Srgb<u8>> {
    let k = k.as_usize().min(colors.len());

    let mut merged: Vec<(Srgb<u8>, u64)> = Vec::with_capacity(candidates.palette.len());
    for (color, count) in candidates.palette.into_iter().zip(candidates.counts) {
        if count == 0 {
            continue;
        }
        if let Some((_, total)) = merged.iter_mut().find(|(c, _)| *c == color) {
            *total += u64::from(count);
        } else {
            merged.push((color, u64::from(count)));
        }
    }

    merged.sort_by_key(|&(_, count)| Reverse(count));

    let mut palette = merged
        .into_iter()
        .map(|(color, _)| color)
        .take(k)
        .collect::<Vec<_>>();

    if palette.len() < k {
        debug!(
            candidates = palette.len(),
            k, "backfilling palette with frequent colors"
        );
        for (color, _) in colors.by_frequency() {
            if palette.len() == k {
                break;
            }
            if !palette.contains(&color) {
                palette.push(color);
            }
        }
    }

    palette
}

/// Weighted k-means over all distinct colors.
///
/// Clusters in [`KmeansOptions::colorspace`], which is sRGB by default.
#[derive(Debug, Clone, Copy)]
pub struct KmeansExtractor;

impl Extractor for KmeansExtractor {
    fn method(&self) -> Method {
        Method::Kmeans
    }

    fn colorspace(&self, options: &MethodOptions) -> ColorSpace {
        options.kmeans.colorspace
    }

    fn candidates(
        &self,
        colors: &UniqueColorCounts,
        k: PaletteSize,
        options: &MethodOptions,
    ) -> QuantizeOutput<Srgb<u8>> {
        kmeans_in(
            self.colorspace(options),
            colors.colors(),
            colors.counts(),
            k,
            &options.kmeans,
        )
    }
}

/// Coarse uniform quantization: the `k` most populated bins, represented by their mean color.
#[derive(Debug, Clone, Copy)]
pub struct AggressiveExtractor;

impl Extractor for AggressiveExtractor {
    fn method(&self) -> Method {
        Method::Aggressive
    }

    fn colorspace(&self, _: &MethodOptions) -> ColorSpace {
        ColorSpace::Srgb
    }

    fn candidates(
        &self,
        colors: &UniqueColorCounts,
        k: PaletteSize,
        options: &MethodOptions,
    ) -> QuantizeOutput<Srgb<u8>> {
        let mut bins = quantize::bins(colors, options.aggressive.bits);
        bins.sort_by_key(|bin| Reverse(bin.count()));
        bins.truncate(k.as_usize());

        QuantizeOutput {
            palette: bins.iter().map(quantize::Bin::mean_u8).collect(),
            counts: bins.iter().map(quantize::Bin::count).collect(),
        }
    }
}

/// Saturation weighted k-means over the saturated, non-dark colors.
///
/// Falls back to plain k-means over all colors if fewer than `k` colors pass the filter.
#[derive(Debug, Clone, Copy)]
pub struct VibrantExtractor;

impl Extractor for VibrantExtractor {
    fn method(&self) -> Method {
        Method::Vibrant
    }

    fn colorspace(&self, _: &MethodOptions) -> ColorSpace {
        ColorSpace::Srgb
    }

    fn candidates(
        &self,
        colors: &UniqueColorCounts,
        k: PaletteSize,
        options: &MethodOptions,
    ) -> QuantizeOutput<Srgb<u8>> {
        let vibrant = &options.vibrant;

        let (vivid, weights): (Vec<_>, Vec<_>) = colors
            .colors()
            .iter()
            .zip(colors.counts())
            .filter_map(|(&color, &count)| {
                let hsv = srgb_to_hsv(color);
                if hsv.saturation < vibrant.min_saturation || hsv.value < vibrant.min_value {
                    return None;
                }
                let boost = 1.0 + f64::from(vibrant.saturation_weight) * f64::from(hsv.saturation);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let weight = (f64::from(count) * boost).round().min(f64::from(u32::MAX)) as u32;
                Some((color, weight.max(1)))
            })
            .unzip();

        if vivid.len() < k.as_usize() {
            debug!(
                vivid = vivid.len(),
                k = k.as_usize(),
                "too few vibrant colors, clustering all colors"
            );
            kmeans_in(
                ColorSpace::Srgb,
                colors.colors(),
                colors.counts(),
                k,
                &options.kmeans,
            )
        } else {
            kmeans_in(ColorSpace::Srgb, &vivid, &weights, k, &options.kmeans)
        }
    }
}

/// Weighted k-means in CIELAB, so clusters follow perceptual distance.
#[derive(Debug, Clone, Copy)]
pub struct LabExtractor;

impl Extractor for LabExtractor {
    fn method(&self) -> Method {
        Method::Lab
    }

    fn colorspace(&self, _: &MethodOptions) -> ColorSpace {
        ColorSpace::Lab
    }

    fn candidates(
        &self,
        colors: &UniqueColorCounts,
        k: PaletteSize,
        options: &MethodOptions,
    ) -> QuantizeOutput<Srgb<u8>> {
        kmeans_in(
            ColorSpace::Lab,
            colors.colors(),
            colors.counts(),
            k,
            &options.kmeans,
        )
    }
}

/// Fine uniform binning followed by weighted k-means over the bin means in CIELAB.
#[derive(Debug, Clone, Copy)]
pub struct MultistageExtractor;

impl Extractor for MultistageExtractor {
    fn method(&self) -> Method {
        Method::Multistage
    }

    fn colorspace(&self, _: &MethodOptions) -> ColorSpace {
        ColorSpace::Lab
    }

    fn candidates(
        &self,
        colors: &UniqueColorCounts,
        k: PaletteSize,
        options: &MethodOptions,
    ) -> QuantizeOutput<Srgb<u8>> {
        let bins = quantize::bins(colors, options.multistage.bits);

        if bins.len() <= k.as_usize() {
            return QuantizeOutput {
                palette: bins.iter().map(quantize::Bin::mean_u8).collect(),
                counts: bins.iter().map(quantize::Bin::count).collect(),
            };
        }

        let points = bins
            .iter()
            .map(|bin| from_srgb_f32::<Lab>(bin.mean_f32()))
            .collect::<Vec<_>>();
        let weights = bins.iter().map(quantize::Bin::count).collect::<Vec<_>>();

        debug!(bins = bins.len(), "clustering bin means");
        kmeans::palette(&points, &weights, k, &options.kmeans).map_palette(|lab| to_srgb(lab))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn extract(method: Method, pixels: &[Srgb<u8>], k: u8) -> Vec<Srgb<u8>> {
        method.extractor().extract_counts(
            &UniqueColorCounts::new(pixels),
            PaletteSize::from(k),
            &MethodOptions::default(),
        )
    }

    fn assert_near(actual: Srgb<u8>, expected: Srgb<u8>, tolerance: u8) {
        let close = [
            (actual.red, expected.red),
            (actual.green, expected.green),
            (actual.blue, expected.blue),
        ]
        .iter()
        .all(|&(a, b)| a.abs_diff(b) <= tolerance);
        assert!(close, "{actual:?} is not near {expected:?}");
    }

    fn two_clusters() -> Vec<Srgb<u8>> {
        noisy_pixels(
            &[(Srgb::new(200, 40, 40), 600), (Srgb::new(40, 40, 200), 400)],
            6,
            1,
        )
    }

    #[test]
    fn table_matches_methods() {
        for (extractor, method) in EXTRACTORS.iter().zip(Method::ALL) {
            assert_eq!(extractor.method(), method);
            assert_eq!(method.extractor().method(), method);
        }
    }

    #[test]
    fn clustering_methods_find_clusters() {
        let pixels = two_clusters();
        for method in [Method::Kmeans, Method::Lab, Method::Multistage] {
            let palette = extract(method, &pixels, 2);
            assert_eq!(palette.len(), 2, "{method}");
            assert_near(palette[0], Srgb::new(200, 40, 40), 8);
            assert_near(palette[1], Srgb::new(40, 40, 200), 8);
        }
    }

    #[test]
    fn deterministic() {
        let pixels = two_clusters();
        for method in Method::ALL {
            assert_eq!(extract(method, &pixels, 4), extract(method, &pixels, 4), "{method}");
        }
    }

    #[test]
    fn exact_length_and_unique() {
        let pixels = test_colors_1024();
        for method in Method::ALL {
            for k in [1, 5, 16] {
                let palette = extract(method, &pixels, k);
                assert_eq!(palette.len(), usize::from(k), "{method}");
                for (i, a) in palette.iter().enumerate() {
                    assert!(!palette[..i].contains(a), "{method} repeated {a:?}");
                }
            }
        }
    }

    #[test]
    fn few_distinct_colors() {
        let red = Srgb::new(255, 0, 0);
        let green = Srgb::new(0, 255, 0);
        let pixels = [red, green, green, red, green];
        for method in Method::ALL {
            assert_eq!(extract(method, &pixels, 5), vec![green, red], "{method}");
        }
    }

    #[test]
    fn aggressive_merges_bins() {
        let mut pixels = vec![Srgb::new(250, 0, 0); 30];
        pixels.extend([Srgb::new(255, 5, 5); 20]);
        pixels.extend([Srgb::new(0, 0, 255); 40]);

        let expected = vec![Srgb::new(252, 2, 2), Srgb::new(0, 0, 255)];
        assert_eq!(extract(Method::Aggressive, &pixels, 2), expected);
        assert_eq!(extract(Method::Multistage, &pixels, 2), expected);
    }

    #[test]
    fn vibrant_prefers_saturated_colors() {
        let pixels = noisy_pixels(
            &[
                (Srgb::new(128, 128, 128), 800),
                (Srgb::new(220, 30, 30), 100),
                (Srgb::new(30, 30, 220), 100),
            ],
            4,
            2,
        );

        let mut palette = extract(Method::Vibrant, &pixels, 2);
        palette.sort_by_key(|c| c.blue);
        assert_near(palette[0], Srgb::new(220, 30, 30), 6);
        assert_near(palette[1], Srgb::new(30, 30, 220), 6);
    }

    #[test]
    fn vibrant_falls_back_on_gray() {
        let pixels = noisy_pixels(&[(Srgb::new(120, 120, 120), 500)], 3, 3);
        let palette = extract(Method::Vibrant, &pixels, 3);
        assert_eq!(palette.len(), 3);
        for color in palette {
            assert_near(color, Srgb::new(120, 120, 120), 3);
        }
    }

    #[test]
    fn finalize_merges_and_backfills() {
        let a = Srgb::new(1, 1, 1);
        let b = Srgb::new(2, 2, 2);
        let c = Srgb::new(3, 3, 3);
        let colors = UniqueColorCounts::new(&[a, b, b, c, c, c]);

        let candidates = QuantizeOutput {
            palette: vec![a, b, a, Srgb::new(9, 9, 9)],
            counts: vec![2, 3, 2, 0],
        };

        assert_eq!(finalize(candidates, &colors, PaletteSize::from(3)), vec![a, b, c]);
        assert_eq!(
            finalize(QuantizeOutput::default(), &colors, PaletteSize::from(2)),
            vec![c, b]
        );
    }
}
