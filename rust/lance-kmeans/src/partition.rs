// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Once-per-partition clustering.
//!
//! A caller that produces one label per row asks a [`PartitionCache`] for the
//! label at each position. The first request clusters the whole partition;
//! every later request is a lookup.

use std::borrow::Cow;

use deepsize::DeepSizeOf;
use log::debug;
use tracing::instrument;

use crate::kmeans::{interpolate_centroids, InitialCentroids, KMeanInit, KMeans, KMeansParams};
use crate::matrix::{DenseMatrix, MinMax};
use crate::{Error, Result};

/// Row source of one partition.
///
/// Implementations own the row storage format. They reject values that are
/// not flat numeric sequences or that contain missing elements; the cache
/// checks that every vector has the partition's dimension.
pub trait PartitionRows {
    /// Number of rows in the partition.
    fn num_rows(&self) -> usize;

    /// The vector of row `row`, or `None` if the row has no value.
    fn row_vector(&self, row: usize) -> Result<Option<Cow<'_, [f64]>>>;

    /// The number of clusters, `k`. Constant across the partition.
    fn num_clusters(&self) -> Result<usize>;

    /// Caller supplied centroids, consulted only with [`KMeanInit::Supplied`].
    fn initial_centroids(&self) -> Result<Option<InitialCentroids>> {
        Ok(None)
    }
}

/// The finished clustering of a partition.
#[derive(Debug, Clone, DeepSizeOf)]
pub struct PartitionResult {
    labels: Vec<u32>,
    iterations: u32,
    objective: f64,
    converged: bool,
}

impl PartitionResult {
    /// Cluster id of every row, in partition order.
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// False only when an iteration cap stopped the run.
    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// Memoized clustering of one partition.
///
/// Create one per partition and drop it with the partition. Nothing is
/// shared between caches.
#[derive(Debug, Default)]
pub struct PartitionCache {
    params: KMeansParams,
    result: Option<PartitionResult>,
}

impl DeepSizeOf for PartitionCache {
    fn deep_size_of_children(&self, context: &mut deepsize::Context) -> usize {
        self.result.deep_size_of_children(context)
    }
}

impl PartitionCache {
    pub fn new(params: KMeansParams) -> Self {
        Self {
            params,
            result: None,
        }
    }

    /// Whether the partition has been clustered.
    pub fn is_done(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&PartitionResult> {
        self.result.as_ref()
    }

    pub fn params(&self) -> &KMeansParams {
        &self.params
    }

    /// The cluster label of the row at `position`.
    ///
    /// The first call clusters the whole partition. If that fails, nothing is
    /// cached and the error is returned: no row of the partition gets a label.
    ///
    /// # Panics
    ///
    /// Panics if `position` is not a row of the partition.
    pub fn label_for_position<R: PartitionRows + ?Sized>(
        &mut self,
        rows: &R,
        position: usize,
    ) -> Result<u32> {
        let result = match &mut self.result {
            Some(result) => result,
            slot @ None => slot.insert(compute(rows, position, &self.params)?),
        };
        assert!(
            position < result.labels.len(),
            "position {} is out of range for a partition of {} rows",
            position,
            result.labels.len()
        );
        Ok(result.labels[position])
    }
}

/// Cluster a whole partition.
///
/// The dimension is taken from the row at `position`, then every row is
/// checked against it.
#[instrument(level = "debug", skip_all, fields(num_rows = rows.num_rows()))]
pub fn compute<R: PartitionRows + ?Sized>(
    rows: &R,
    position: usize,
    params: &KMeansParams,
) -> Result<PartitionResult> {
    let num_rows = rows.num_rows();
    assert!(
        position < num_rows,
        "position {} is out of range for a partition of {} rows",
        position,
        num_rows
    );

    let dimension = require_vector(rows, position)?.len();
    if dimension == 0 {
        return Err(Error::invalid_input("vectors must not be empty"));
    }
    let k = rows.num_clusters()?;
    if k == 0 {
        return Err(Error::invalid_input("the number of clusters must be positive"));
    }
    if k.checked_mul(dimension).is_none() {
        return Err(Error::invalid_input(format!(
            "{} centroids of dimension {} overflow",
            k, dimension
        )));
    }

    let (data, min_max) = assemble(rows, dimension)?;

    let centroids = match params.init {
        KMeanInit::Supplied => rows
            .initial_centroids()?
            .ok_or_else(|| Error::invalid_initial_centroids("initial centroids must not be NULL"))?
            .try_into_flat(k, dimension)?,
        KMeanInit::Interpolated => interpolate_centroids(&min_max, k)?,
    };

    debug!(
        "KMeans: clustering partition of {} rows, dimension {}, k {}",
        num_rows, dimension, k
    );
    let mut kmeans = KMeans::with_centroids(centroids, dimension);
    let fit = kmeans.train(&data, params);

    Ok(PartitionResult {
        labels: fit.membership,
        iterations: fit.iterations,
        objective: fit.objective,
        converged: fit.converged,
    })
}

fn require_vector<R: PartitionRows + ?Sized>(rows: &R, row: usize) -> Result<Cow<'_, [f64]>> {
    rows.row_vector(row)?
        .ok_or_else(|| Error::invalid_input(format!("row {} has no vector", row)))
}

/// Read every row into a flat matrix, tracking per-dimension bounds.
fn assemble<R: PartitionRows + ?Sized>(
    rows: &R,
    dimension: usize,
) -> Result<(DenseMatrix<'static>, MinMax)> {
    let num_rows = rows.num_rows();
    let mut data = DenseMatrix::with_capacity(dimension, num_rows);
    let mut min_max = MinMax::new(dimension);
    for row in 0..num_rows {
        let vector = require_vector(rows, row)?;
        if vector.len() != dimension {
            return Err(Error::invalid_input(format!(
                "row {} has dimension {}, expected {}",
                row,
                vector.len(),
                dimension
            )));
        }
        data.push_row(&vector);
        min_max.update(&vector);
    }
    Ok((data, min_max))
}
