// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Data generation utilities for unit tests

use std::iter::repeat_with;
use std::sync::Arc;

use arrow_array::types::Float64Type;
use arrow_array::{FixedSizeListArray, Float64Array, ListArray};
use arrow_schema::{DataType, Field};
use rand::distributions::Uniform;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Create a seeded random float64 array where each element is uniformly
/// distributed between [0..1]
pub fn generate_random_array_with_seed(n: usize, seed: [u8; 32]) -> Float64Array {
    let mut rng = StdRng::from_seed(seed);
    Float64Array::from_iter_values(repeat_with(|| rng.gen::<f64>()).take(n))
}

/// Create a random float64 array where each element is uniformly
/// distributed across the given range
pub fn generate_scaled_random_array(n: usize, min: f64, max: f64) -> Float64Array {
    let mut rng = StdRng::from_seed([13; 32]);
    let distribution = Uniform::new(min, max);
    Float64Array::from_iter_values(repeat_with(|| distribution.sample(&mut rng)).take(n))
}

/// Generate well separated blobs around the given `centers`.
///
/// `centers` is flat, `centers.len() / dimension` blobs of `dimension` values.
/// Every blob gets `per_cluster` points, each coordinate jittered by at most
/// `spread` from its center. Points are emitted blob by blob, so the point at
/// row `i` belongs to blob `i / per_cluster`.
pub fn generate_blobs(
    centers: &[f64],
    dimension: usize,
    per_cluster: usize,
    spread: f64,
    seed: u64,
) -> Vec<f64> {
    assert!(dimension > 0);
    assert_eq!(centers.len() % dimension, 0);
    let mut rng = StdRng::seed_from_u64(seed);
    let jitter = Uniform::new_inclusive(-spread, spread);

    let mut values = Vec::with_capacity(centers.len() * per_cluster);
    for center in centers.chunks_exact(dimension) {
        for _ in 0..per_cluster {
            values.extend(center.iter().map(|c| c + jitter.sample(&mut rng)));
        }
    }
    values
}

/// Wrap flat values as a `FixedSizeList<Float64>` of `dimension`.
pub fn fixed_size_vectors(values: Vec<f64>, dimension: i32) -> FixedSizeListArray {
    let field = Arc::new(Field::new("item", DataType::Float64, true));
    FixedSizeListArray::new(field, dimension, Arc::new(Float64Array::from(values)), None)
}

/// Build a variable length `List<Float64>` array, one entry per row.
///
/// `None` rows become nulls, `None` elements become null children.
pub fn list_vectors<I, R>(rows: I) -> ListArray
where
    I: IntoIterator<Item = Option<R>>,
    R: IntoIterator<Item = Option<f64>>,
{
    ListArray::from_iter_primitive::<Float64Type, _, _>(rows)
}
