// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Lloyd's k-means over a [`DenseMatrix`].
//!
//! Every pass writes the membership in place (`assign`), then rewrites the
//! centroids in place from that membership (`update_centroids`). Each buffer
//! has exactly one writer per pass.

use log::{debug, info, log_enabled, trace, warn, Level};
use tracing::instrument;

use crate::distance::{euclidean_distance, euclidean_distance_batch};
use crate::kernels::argmin;
use crate::matrix::DenseMatrix;

pub mod init;

pub use init::{interpolate_centroids, InitialCentroids};

/// Objective improvement under which the iteration stops.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// How the initial centroids are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KMeanInit {
    /// Interpolate between the per-dimension minima and maxima of the data.
    #[default]
    Interpolated,
    /// Use the centroids supplied by the row source.
    Supplied,
}

/// KMean Training Parameters
#[derive(Debug, Clone)]
pub struct KMeansParams {
    /// Stop once the objective improves by less than this absolute amount.
    pub tolerance: f64,

    /// Optional cap on the number of passes.
    ///
    /// `None` iterates until the tolerance test passes, however long that takes.
    pub max_iters: Option<u32>,

    /// Init methods.
    pub init: KMeanInit,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iters: None,
            init: KMeanInit::Interpolated,
        }
    }
}

/// Where the training loop is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvergenceState {
    /// Centroids are seeded, no pass has run.
    Init,
    /// At least one pass ran and the objective is still improving.
    Iterating { iteration: u32, objective: f64 },
    /// Terminal.
    Converged { iterations: u32, objective: f64 },
    /// Terminal, stopped by [`KMeansParams::max_iters`] before converging.
    Exhausted { iterations: u32, objective: f64 },
}

impl ConvergenceState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged { .. } | Self::Exhausted { .. })
    }
}

/// Tracks the objective across passes and decides when to stop.
#[derive(Debug)]
pub struct ObjectiveTracker {
    previous: f64,
    tolerance: f64,
    max_iters: Option<u32>,
    state: ConvergenceState,
}

impl ObjectiveTracker {
    /// `baseline` is the objective of the seeded centroids. It is only ever
    /// compared against, never reported.
    pub fn new(baseline: f64, params: &KMeansParams) -> Self {
        Self {
            previous: baseline,
            tolerance: params.tolerance,
            max_iters: params.max_iters,
            state: ConvergenceState::Init,
        }
    }

    /// Record the objective of a finished pass and return the new state.
    ///
    /// # Panics
    ///
    /// Panics if called after a terminal state was reached.
    pub fn observe(&mut self, objective: f64) -> ConvergenceState {
        let iteration = match self.state {
            ConvergenceState::Init => 1,
            ConvergenceState::Iterating { iteration, .. } => iteration + 1,
            _ => panic!("KMeans: objective observed after termination"),
        };
        let diff = self.previous - objective;
        debug!(
            "KMeans: iteration {}, objective {}, improvement {}",
            iteration, objective, diff
        );

        self.state = if diff < self.tolerance {
            ConvergenceState::Converged {
                iterations: iteration,
                objective,
            }
        } else if self.max_iters.is_some_and(|max| iteration >= max) {
            ConvergenceState::Exhausted {
                iterations: iteration,
                objective,
            }
        } else {
            self.previous = objective;
            ConvergenceState::Iterating {
                iteration,
                objective,
            }
        };
        self.state
    }

    pub fn state(&self) -> ConvergenceState {
        self.state
    }
}

/// Outcome of [`KMeans::train`].
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster id of every input vector, in input order.
    pub membership: Vec<u32>,
    /// Total distance of every vector to its centroid, after the last pass.
    pub objective: f64,
    /// Number of assignment/update passes executed.
    pub iterations: u32,
    /// False if the iteration cap stopped the loop.
    pub converged: bool,
}

/// KMeans model: `k` centroids of `dimension`, stored flat.
#[derive(Debug, Clone)]
pub struct KMeans {
    /// Centroids for each of the k clusters.
    ///
    /// k * dimension.
    pub centroids: Vec<f64>,

    /// Vector dimension.
    pub dimension: usize,

    /// The number of clusters
    pub k: usize,
}

impl KMeans {
    /// Create a [`KMeans`] with existing centroids.
    ///
    /// # Panics
    ///
    /// Panics if `centroids` is empty or not a multiple of `dimension` long.
    pub fn with_centroids(centroids: Vec<f64>, dimension: usize) -> Self {
        assert!(dimension > 0);
        assert!(!centroids.is_empty() && centroids.len() % dimension == 0);
        let k = centroids.len() / dimension;
        Self {
            centroids,
            dimension,
            k,
        }
    }

    pub fn centroid(&self, cluster: usize) -> &[f64] {
        &self.centroids[cluster * self.dimension..(cluster + 1) * self.dimension]
    }

    /// Write the nearest centroid of every vector into `membership`.
    ///
    /// Ties go to the lowest centroid index.
    pub fn assign(&self, data: &DenseMatrix, membership: &mut [u32]) {
        debug_assert_eq!(data.num_columns(), self.dimension);
        debug_assert_eq!(data.num_rows(), membership.len());
        for (vector, cluster) in data.iter().zip(membership.iter_mut()) {
            // k >= 1, so there is always a minimum.
            *cluster = argmin(euclidean_distance_batch(
                vector,
                &self.centroids,
                self.dimension,
            ))
            .unwrap_or_default();
        }
    }

    /// Membership of every vector, freshly allocated.
    pub fn compute_membership(&self, data: &DenseMatrix) -> Vec<u32> {
        let mut membership = vec![0; data.num_rows()];
        self.assign(data, &mut membership);
        membership
    }

    /// Recompute every centroid as the mean of the vectors assigned to it.
    ///
    /// A centroid nobody is assigned to becomes the zero vector.
    pub fn update_centroids(&mut self, data: &DenseMatrix, membership: &[u32]) {
        let dimension = self.dimension;
        let mut cluster_cnts = vec![0_usize; self.k];
        self.centroids.fill(0.0);
        data.iter()
            .zip(membership.iter())
            .for_each(|(vector, &cluster_id)| {
                let cluster_id = cluster_id as usize;
                cluster_cnts[cluster_id] += 1;
                for (sum, v) in self.centroids[cluster_id * dimension..(cluster_id + 1) * dimension]
                    .iter_mut()
                    .zip(vector)
                {
                    *sum += v;
                }
            });
        cluster_cnts.iter().enumerate().for_each(|(i, &cnt)| {
            if cnt == 0 {
                warn!("KMeans: cluster {} is empty", i);
            } else {
                self.centroids[i * dimension..(i + 1) * dimension]
                    .iter_mut()
                    .for_each(|v| *v /= cnt as f64);
            }
        });
    }

    /// Total distance from every vector to its assigned centroid.
    pub fn objective(&self, data: &DenseMatrix, membership: &[u32]) -> f64 {
        data.iter()
            .zip(membership.iter())
            .map(|(vector, &cluster_id)| {
                euclidean_distance(vector, self.centroid(cluster_id as usize))
            })
            .sum()
    }

    /// Run Lloyd's iterations from the current centroids until the objective
    /// stops improving by at least `params.tolerance`.
    ///
    /// The loop has no cap unless `params.max_iters` is set. On return the
    /// centroids hold the final means.
    #[instrument(level = "debug", skip_all, fields(n = data.num_rows(), k = self.k, dimension = self.dimension))]
    pub fn train(&mut self, data: &DenseMatrix, params: &KMeansParams) -> KMeansFit {
        // Nothing is assigned yet: the all-zero membership only provides a baseline.
        let mut membership = vec![0_u32; data.num_rows()];
        let mut tracker = ObjectiveTracker::new(self.objective(data, &membership), params);

        loop {
            self.assign(data, &mut membership);
            self.update_centroids(data, &membership);
            self.log_centroids();
            match tracker.observe(self.objective(data, &membership)) {
                ConvergenceState::Converged {
                    iterations,
                    objective,
                } => {
                    info!(
                        "KMeans training: converged at iteration {}, objective {}",
                        iterations, objective
                    );
                    return KMeansFit {
                        membership,
                        objective,
                        iterations,
                        converged: true,
                    };
                }
                ConvergenceState::Exhausted {
                    iterations,
                    objective,
                } => {
                    warn!(
                        "KMeans training: stopped after {} iterations without converging, objective {}",
                        iterations, objective
                    );
                    return KMeansFit {
                        membership,
                        objective,
                        iterations,
                        converged: false,
                    };
                }
                ConvergenceState::Init | ConvergenceState::Iterating { .. } => {}
            }
        }
    }

    fn log_centroids(&self) {
        if !log_enabled!(Level::Trace) {
            return;
        }
        for (i, centroid) in self.centroids.chunks_exact(self.dimension).enumerate() {
            trace!("KMeans: centroid {}: {:?}", i, centroid);
        }
    }
}
