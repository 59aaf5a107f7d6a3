#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use color_extractor::{PixelBuffer, UniqueColorCounts};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

pub const BENCH_DIR: &str = "img/bench";

pub fn load_images(images: &[PathBuf]) -> Vec<(String, PixelBuffer)> {
    images
        .iter()
        .map(|path| {
            PixelBuffer::open(path)
                .map(|pixels| (path.file_name().unwrap().to_string_lossy().into_owned(), pixels))
        })
        .collect::<Result<_, _>>()
        .expect("loaded each image")
}

/// Loads every image under `dir` relative to the crate root, if the directory exists.
pub fn load_image_dir_relative_to_root(dir: impl AsRef<Path>) -> Vec<(String, PixelBuffer)> {
    // assume current exe path is something like: target/build/deps/current_exe
    let exe = std::env::current_exe().unwrap();
    let root = exe
        .parent()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .and_then(Path::parent)
        .unwrap();

    let Ok(entries) = std::fs::read_dir(root.join(dir)) else {
        return Vec::new();
    };

    let mut paths = entries
        .collect::<Result<Vec<_>, _>>()
        .expect("read each file")
        .iter()
        .map(std::fs::DirEntry::path)
        .collect::<Vec<_>>();

    paths.sort();

    load_images(&paths)
}

/// A smooth two dimensional gradient, many distinct colors.
pub fn gradient(width: u32, height: u32) -> PixelBuffer {
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                Srgb::new(
                    (x * 255 / width.max(1)) as u8,
                    (y * 255 / height.max(1)) as u8,
                    ((x + y) * 127 / (width + height).max(1)) as u8,
                )
            })
        })
        .collect();

    PixelBuffer::new(width, height, pixels).unwrap()
}

/// A few noisy blobs of color, like a photo of a handful of objects.
pub fn clusters(width: u32, height: u32, seed: u64) -> PixelBuffer {
    let centers = [
        Srgb::new(200u8, 40, 40),
        Srgb::new(40, 160, 60),
        Srgb::new(30, 60, 200),
        Srgb::new(230, 210, 90),
        Srgb::new(90, 90, 90),
        Srgb::new(240, 240, 240),
    ];

    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    let mut jitter = |c: u8| (i16::from(c) + rng.gen_range(-12..=12)).clamp(0, 255) as u8;

    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| {
            let center = centers[((x * 3 / width.max(1)) + (y * 2 / height.max(1)) * 3) as usize];
            Srgb::new(jitter(center.red), jitter(center.green), jitter(center.blue))
        })
        .collect();

    PixelBuffer::new(width, height, pixels).unwrap()
}

/// Uniformly random colors, the worst case for deduplication.
pub fn random(width: u32, height: u32, seed: u64) -> PixelBuffer {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    let pixels = (0..width * height)
        .map(|_| Srgb::new(rng.gen(), rng.gen(), rng.gen()))
        .collect();

    PixelBuffer::new(width, height, pixels).unwrap()
}

pub fn load_bench_images() -> Vec<(String, PixelBuffer)> {
    let mut images = vec![
        ("gradient".to_owned(), gradient(640, 480)),
        ("clusters".to_owned(), clusters(640, 480, 0)),
        ("random".to_owned(), random(512, 512, 0)),
    ];
    images.extend(load_image_dir_relative_to_root(BENCH_DIR));
    images
}

static BENCH_IMAGES: OnceLock<Vec<(String, PixelBuffer)>> = OnceLock::new();

pub fn bench_images() -> &'static [(String, PixelBuffer)] {
    BENCH_IMAGES.get_or_init(load_bench_images)
}

pub fn to_unique_counts(images: &[(String, PixelBuffer)]) -> Vec<(String, UniqueColorCounts)> {
    images
        .iter()
        .map(|(name, pixels)| (name.clone(), UniqueColorCounts::new(pixels.pixels())))
        .collect()
}
