// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Centroid initialization.
//!
//! There is no randomness here: the same partition always seeds the same
//! centroids, so every row of a partition sees the same clustering.

use crate::matrix::MinMax;
use crate::{Error, Result};

/// Centroids handed in by the caller, before shape validation.
///
/// `None` elements stand for missing values and are rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialCentroids {
    /// `k * dimension` values, centroid after centroid.
    Flat(Vec<Option<f64>>),
    /// `k` groups of `dimension` values. A `None` group is a missing centroid.
    Nested(Vec<Option<Vec<Option<f64>>>>),
}

impl InitialCentroids {
    /// Validate the shape against `k x dimension` and flatten.
    ///
    /// Fails with [`Error::InvalidInitialCentroids`] on a shape mismatch or a
    /// missing element.
    pub fn try_into_flat(self, k: usize, dimension: usize) -> Result<Vec<f64>> {
        let missing = || Error::invalid_initial_centroids("centroids must not contain NULL elements");
        let total = k.checked_mul(dimension).ok_or_else(|| {
            Error::invalid_initial_centroids(format!(
                "{} centroids of dimension {} overflow",
                k, dimension
            ))
        })?;
        match self {
            Self::Flat(values) => {
                if values.len() != total {
                    return Err(Error::invalid_initial_centroids(format!(
                        "expected {} values ({} centroids of dimension {}), got {}",
                        total,
                        k,
                        dimension,
                        values.len()
                    )));
                }
                values
                    .into_iter()
                    .map(|v| v.ok_or_else(missing))
                    .collect()
            }
            Self::Nested(groups) => {
                if groups.len() != k {
                    return Err(Error::invalid_initial_centroids(format!(
                        "expected {} centroids, got {}",
                        k,
                        groups.len()
                    )));
                }
                let mut flat = Vec::with_capacity(total);
                for (i, group) in groups.into_iter().enumerate() {
                    let group = group.ok_or_else(missing)?;
                    if group.len() != dimension {
                        return Err(Error::invalid_initial_centroids(format!(
                            "centroid {} has dimension {}, expected {}",
                            i,
                            group.len(),
                            dimension
                        )));
                    }
                    for v in group {
                        flat.push(v.ok_or_else(missing)?);
                    }
                }
                Ok(flat)
            }
        }
    }
}

impl From<Vec<f64>> for InitialCentroids {
    fn from(values: Vec<f64>) -> Self {
        Self::Flat(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<Vec<f64>>> for InitialCentroids {
    fn from(groups: Vec<Vec<f64>>) -> Self {
        Self::Nested(
            groups
                .into_iter()
                .map(|g| Some(g.into_iter().map(Some).collect()))
                .collect(),
        )
    }
}

/// Place `k` centroids on the line between the per-dimension minima and maxima.
///
/// `centroid[i][a] = (max[a] - min[a]) * (i + 1) / (dimension + 1) + min[a]`
///
/// The divisor is `dimension + 1`, not `k + 1`. Keep it: changing it changes
/// which labels existing partitions get.
///
/// Fails with [`Error::InvalidInput`] if `k x dimension` values cannot be
/// allocated.
pub fn interpolate_centroids(min_max: &MinMax, k: usize) -> Result<Vec<f64>> {
    let dimension = min_max.dimension();
    let divisor = (dimension + 1) as f64;
    let total = k.checked_mul(dimension).ok_or_else(|| {
        Error::invalid_input(format!(
            "{} centroids of dimension {} overflow",
            k, dimension
        ))
    })?;
    let mut centroids = Vec::new();
    centroids.try_reserve_exact(total).map_err(|err| {
        Error::invalid_input(format!(
            "cannot allocate {} centroids of dimension {}: {}",
            k, dimension, err
        ))
    })?;
    for i in 0..k {
        let step = (i + 1) as f64;
        centroids.extend(
            min_max
                .min()
                .iter()
                .zip(min_max.max())
                .map(|(&min, &max)| (max - min) * step / divisor + min),
        );
    }
    Ok(centroids)
}
