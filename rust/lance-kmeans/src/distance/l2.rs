// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! L2 (Euclidean) distance.
//!

use std::iter::Sum;

use num_traits::real::Real;

/// Calculate the squared L2 distance between two vectors.
///
pub trait L2 {
    type Output;

    /// Calculate the squared L2 distance between two vectors.
    fn l2(&self, other: &Self) -> Self::Output;
}

/// Calculate the squared L2 distance between two vectors, using scalar operations.
///
/// Rely on compiler auto-vectorization.
#[inline]
fn l2_scalar<T: Real + Sum>(from: &[T], to: &[T]) -> T {
    debug_assert_eq!(from.len(), to.len());
    from.iter()
        .zip(to.iter())
        .map(|(&a, &b)| (a - b).powi(2))
        .sum::<T>()
}

impl L2 for [f32] {
    type Output = f32;

    #[inline]
    fn l2(&self, other: &[f32]) -> f32 {
        l2_scalar(self, other)
    }
}

impl L2 for [f64] {
    type Output = f64;

    #[inline]
    fn l2(&self, other: &[f64]) -> f64 {
        l2_scalar(self, other)
    }
}

/// Compute the squared L2 distance between two vectors.
#[inline]
pub fn l2_distance(from: &[f64], to: &[f64]) -> f64 {
    from.l2(to)
}

/// Euclidean distance: the square root of the sum of squared differences.
///
/// Both vectors must have the same length. This is not re-validated outside
/// of debug builds.
#[inline]
pub fn euclidean_distance(from: &[f64], to: &[f64]) -> f64 {
    from.l2(to).sqrt()
}

/// Compute the Euclidean distance between a vector and a batch of vectors.
///
/// Parameters
///
/// - `from`: the vector to compute distance from.
/// - `to`: a flat list of vectors to compute distance to.
/// - `dimension`: the dimension of the vectors.
pub fn euclidean_distance_batch<'a>(
    from: &'a [f64],
    to: &'a [f64],
    dimension: usize,
) -> impl Iterator<Item = f64> + 'a {
    debug_assert_eq!(from.len(), dimension);
    debug_assert_eq!(to.len() % dimension, 0);

    to.chunks_exact(dimension)
        .map(move |v| euclidean_distance(from, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_euclidean_distance() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 6.0, 3.0];
        assert_relative_eq!(l2_distance(&a, &b), 25.0);
        assert_relative_eq!(euclidean_distance(&a, &b), 5.0);
        assert_relative_eq!(euclidean_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_l2_f32() {
        let a: &[f32] = &[0.0, 3.0];
        let b: &[f32] = &[4.0, 0.0];
        assert_relative_eq!(a.l2(b), 25.0_f32);
    }

    #[test]
    fn test_distance_batch() {
        let from = [0.0, 0.0];
        let to = [3.0, 4.0, 0.0, 1.0, -6.0, 8.0];
        let dists = euclidean_distance_batch(&from, &to, 2).collect::<Vec<_>>();
        assert_eq!(dists.len(), 3);
        assert_relative_eq!(dists[0], 5.0);
        assert_relative_eq!(dists[1], 1.0);
        assert_relative_eq!(dists[2], 10.0);
    }

    fn vector_pair() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
        (1_usize..32).prop_flat_map(|dim| {
            (
                prop::collection::vec(-1e3_f64..1e3, dim),
                prop::collection::vec(-1e3_f64..1e3, dim),
            )
        })
    }

    proptest::proptest! {
        #[test]
        fn test_distance_symmetric((a, b) in vector_pair()) {
            prop_assert_eq!(euclidean_distance(&a, &b), euclidean_distance(&b, &a));
            prop_assert!(euclidean_distance(&a, &b) >= 0.0);
        }

        #[test]
        fn test_distance_zero_iff_equal((a, b) in vector_pair()) {
            prop_assert_eq!(euclidean_distance(&a, &a), 0.0);
            let dist = euclidean_distance(&a, &b);
            prop_assert_eq!(dist == 0.0, a == b);
        }
    }
}
