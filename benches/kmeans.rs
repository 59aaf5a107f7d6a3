#[path = "../util/util.rs"]
mod util;

use util::{bench_images, to_unique_counts};

use std::time::Duration;

use color_extractor::{kmeans, KmeansOptions, PaletteSize, UniqueColorCounts};
use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use palette::{IntoColor, Lab, Srgb};

fn bench<Points>(
    c: &mut Criterion,
    group: &str,
    points: &[(String, Points)],
    mut f: impl FnMut(&mut Bencher<WallTime>, &(PaletteSize, &Points)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500));

    for (k, secs) in [
        (PaletteSize::MAX, 4),
        (64.into(), 3),
        (16.into(), 2),
        (5.into(), 2),
    ] {
        group.measurement_time(Duration::from_secs(secs));
        for (name, points) in points {
            group.bench_with_input(BenchmarkId::new(k.to_string(), name), &(k, points), &mut f);
        }
    }
}

fn convert<Color>(
    counts: Vec<(String, UniqueColorCounts)>,
    convert_color: impl Fn(Srgb<u8>) -> Color + Copy,
) -> Vec<(String, (Vec<Color>, Vec<u32>))> {
    counts
        .into_iter()
        .map(|(name, counts)| (name, (counts.convert(convert_color), counts.counts().to_vec())))
        .collect()
}

fn kmeans_srgb(c: &mut Criterion) {
    let points = convert(to_unique_counts(bench_images()), |srgb| srgb.into_format::<f32>());
    let options = KmeansOptions::new();
    bench(c, "kmeans_srgb", &points, |b, &(k, (colors, counts))| {
        b.iter(|| kmeans::palette(colors, counts, k, &options))
    })
}

fn kmeans_lab(c: &mut Criterion) {
    let points = convert(to_unique_counts(bench_images()), |srgb| -> Lab {
        srgb.into_format::<f32>().into_linear().into_color()
    });
    let options = KmeansOptions::new();
    bench(c, "kmeans_lab", &points, |b, &(k, (colors, counts))| {
        b.iter(|| kmeans::palette(colors, counts, k, &options))
    })
}

criterion_group!(benches, kmeans_srgb, kmeans_lab);
criterion_main!(benches);
