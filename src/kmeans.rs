//! Weighted k-means clustering of deduplicated colors.
//!
//! Centroids are initialized with k-means++ (weighted by color counts) and then
//! refined with Lloyd iterations until no centroid moves further than the tolerance
//! or the iteration limit is reached.
//!
//! The random number generator is seeded from [`KmeansOptions`],
//! so the same input and options always produce the same palette.

use crate::{ColorComponents, KmeansOptions, PaletteSize, QuantizeOutput};
use palette::cast::{self, AsArrays};
use rand::{distributions::WeightedIndex, prelude::Distribution, SeedableRng};
use rand_distr::weighted_alias::WeightedAliasIndex;
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::array;
use tracing::{debug, trace};
use wide::{f32x8, CmpLt};

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The squared Euclidean distance between two points.
#[inline]
fn distance_squared(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d = array::from_fn::<_, 3, _>(|i| a[i] - b[i]);
    d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
}

/// Nearest centroid lookup with the centroids laid out in SIMD lanes.
///
/// Centroids are split into chunks of 8, one `f32x8` per component.
/// The last chunk is padded with infinite components, which can never be nearest.
#[derive(Debug, Clone)]
pub(crate) struct Nearest {
    chunks: Vec<[f32x8; 3]>,
    len: usize,
}

impl Nearest {
    pub(crate) fn new(centroids: &[[f32; 3]]) -> Self {
        let chunks = centroids.chunks_exact(8);
        let mut components = Vec::with_capacity(centroids.len().div_ceil(8));

        components.extend(
            chunks
                .clone()
                .map(|chunk| array::from_fn(|i| f32x8::new(array::from_fn(|j| chunk[j][i])))),
        );

        if !chunks.remainder().is_empty() {
            let mut arr = [[f32::INFINITY; 8]; 3];
            for (j, color) in chunks.remainder().iter().enumerate() {
                for (arr, &c) in arr.iter_mut().zip(color) {
                    arr[j] = c;
                }
            }
            components.push(arr.map(f32x8::new));
        }

        Self { chunks: components, len: centroids.len() }
    }

    /// The number of centroids.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Returns the index of, and squared distance to, the centroid nearest to `point`.
    ///
    /// Ties go to the lowest centroid index.
    #[inline]
    pub(crate) fn nearest(&self, point: [f32; 3]) -> (usize, f32) {
        let one = f32x8::splat(1.0);
        let mut cur_chunk = f32x8::splat(0.0);
        let mut min_chunk = cur_chunk;
        let mut min_distance = f32x8::splat(f32::INFINITY);

        let query = point.map(f32x8::splat);

        for chunk in &self.chunks {
            let d0 = query[0] - chunk[0];
            let d1 = query[1] - chunk[1];
            let d2 = query[2] - chunk[2];
            let distance = d0 * d0 + d1 * d1 + d2 * d2;

            let mask = distance.cmp_lt(min_distance);
            min_chunk = mask.blend(cur_chunk, min_chunk);
            min_distance = min_distance.fast_min(distance);
            cur_chunk += one;
        }

        let mut min_index = 0;
        let mut min_dist = f32::INFINITY;
        for (lane, (&distance, &chunk)) in min_distance
            .as_array_ref()
            .iter()
            .zip(min_chunk.as_array_ref())
            .enumerate()
        {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = chunk as usize * 8 + lane;
            if distance < min_dist || (distance == min_dist && index < min_index) {
                min_dist = distance;
                min_index = index;
            }
        }

        (min_index, min_dist)
    }
}

/// Chooses up to `k` initial centroids with weighted k-means++.
///
/// Fewer than `k` centroids are returned if every remaining point coincides with a centroid.
fn init_centroids(
    points: &[[f32; 3]],
    weights: &[u32],
    k: usize,
    rng: &mut Xoroshiro128PlusPlus,
) -> Vec<[f32; 3]> {
    let mut centroids = Vec::with_capacity(k);

    let first = WeightedAliasIndex::new(weights.iter().copied().map(u64::from).collect())
        .map(|distribution| distribution.sample(rng))
        .unwrap_or_else(|_| {
            let mut heaviest = 0;
            for (i, &w) in weights.iter().enumerate() {
                if w > weights[heaviest] {
                    heaviest = i;
                }
            }
            heaviest
        });

    centroids.push(points[first]);

    let mut min_distance = points
        .iter()
        .map(|&p| f64::from(distance_squared(p, points[first])))
        .collect::<Vec<_>>();

    while centroids.len() < k {
        let Ok(distribution) = WeightedIndex::new(
            min_distance
                .iter()
                .zip(weights)
                .map(|(&d, &w)| d * f64::from(w)),
        ) else {
            break;
        };

        let next = points[distribution.sample(rng)];
        centroids.push(next);

        for (d, &p) in min_distance.iter_mut().zip(points) {
            *d = d.min(f64::from(distance_squared(p, next)));
        }
    }

    centroids
}

/// Assigns each point to its nearest centroid, returning the squared distances.
fn assign(nearest: &Nearest, points: &[[f32; 3]], assignments: &mut [u32]) -> Vec<f32> {
    #[allow(clippy::cast_possible_truncation)]
    let assign_one = |(assignment, &point): (&mut u32, &[f32; 3])| {
        let (i, distance) = nearest.nearest(point);
        *assignment = i as u32;
        distance
    };

    #[cfg(feature = "threads")]
    {
        assignments.par_iter_mut().zip(points).map(assign_one).collect()
    }

    #[cfg(not(feature = "threads"))]
    {
        assignments.iter_mut().zip(points).map(assign_one).collect()
    }
}

/// Moves each centroid to the weighted mean of its points, returning the largest move.
///
/// A centroid without points is moved onto the point farthest from its own centroid.
fn update_centroids(
    centroids: &mut [[f32; 3]],
    points: &[[f32; 3]],
    weights: &[u32],
    assignments: &[u32],
    mut distances: Vec<f32>,
) -> f32 {
    let mut sums = vec![[0.0f64; 3]; centroids.len()];
    let mut totals = vec![0.0f64; centroids.len()];

    for ((point, &weight), &i) in points.iter().zip(weights).zip(assignments) {
        let i = i as usize;
        let weight = f64::from(weight);
        for (sum, &c) in sums[i].iter_mut().zip(point) {
            *sum += weight * f64::from(c);
        }
        totals[i] += weight;
    }

    let mut max_shift = 0.0f32;
    for ((centroid, sum), &total) in centroids.iter_mut().zip(sums).zip(&totals) {
        let next = if total > 0.0 {
            #[allow(clippy::cast_possible_truncation)]
            sum.map(|s| (s / total) as f32)
        } else {
            let mut farthest = 0;
            for (i, &d) in distances.iter().enumerate() {
                if d > distances[farthest] {
                    farthest = i;
                }
            }
            distances[farthest] = 0.0;
            points[farthest]
        };

        max_shift = max_shift.max(distance_squared(*centroid, next).sqrt());
        *centroid = next;
    }

    max_shift
}

/// Computes a palette of up to `k` centroids from weighted points.
///
/// `weights` gives the number of pixels each point stands for and must have the same length
/// as `points`. If there are at most `k` points, they are returned as is.
/// The counts of the output are the total weight assigned to each centroid.
#[must_use]
pub fn palette<Color>(
    points: &[Color],
    weights: &[u32],
    k: PaletteSize,
    options: &KmeansOptions,
) -> QuantizeOutput<Color>
where
    Color: ColorComponents<f32, 3>,
{
    debug_assert_eq!(points.len(), weights.len());

    let k = k.as_usize();
    if k == 0 || points.is_empty() {
        return QuantizeOutput::default();
    }

    if points.len() <= k {
        return QuantizeOutput {
            palette: points.to_vec(),
            counts: weights.to_vec(),
        };
    }

    let points_arr = points.as_arrays();
    let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(options.seed);
    let mut centroids = init_centroids(points_arr, weights, k, rng);
    let mut assignments = vec![0u32; points.len()];

    let mut iterations = 0;
    let mut converged = false;
    while iterations < options.max_iterations {
        iterations += 1;
        let nearest = Nearest::new(&centroids);
        let distances = assign(&nearest, points_arr, &mut assignments);
        let shift = update_centroids(&mut centroids, points_arr, weights, &assignments, distances);
        trace!(iteration = iterations, shift, "k-means iteration");

        if shift <= options.tolerance {
            converged = true;
            break;
        }
    }

    debug!(
        points = points.len(),
        k = centroids.len(),
        iterations,
        converged,
        "k-means finished"
    );

    let nearest = Nearest::new(&centroids);
    let mut sums = vec![0u64; nearest.len()];
    for (&point, &weight) in points_arr.iter().zip(weights) {
        let (i, _) = nearest.nearest(point);
        sums[i] += u64::from(weight);
    }

    QuantizeOutput {
        palette: centroids.into_iter().map(cast::from_array).collect(),
        counts: sums
            .into_iter()
            .map(|sum| u32::try_from(sum).unwrap_or(u32::MAX))
            .collect(),
    }
}
