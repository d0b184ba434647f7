// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Partition-scoped k-means over [Apache Arrow](https://docs.rs/arrow/latest/arrow/) vectors.
//!
//! Each partition of rows is clustered once, with Lloyd's algorithm seeded
//! deterministically, and every row of the partition then reads its label
//! from the cached result.
//!
//! ```
//! use std::sync::Arc;
//!
//! use arrow_array::{types::Float64Type, ListArray};
//! use lance_kmeans::{arrow::ArrowPartition, KMeansParams, PartitionCache};
//!
//! let vectors = ListArray::from_iter_primitive::<Float64Type, _, _>(vec![
//!     Some(vec![Some(1.0)]),
//!     Some(vec![Some(2.0)]),
//!     Some(vec![Some(9.0)]),
//!     Some(vec![Some(10.0)]),
//! ]);
//! let partition = ArrowPartition::try_new(Arc::new(vectors), 2)?;
//! let mut cache = PartitionCache::new(KMeansParams::default());
//! assert_eq!(cache.label_for_position(&partition, 0)?, 0);
//! assert_eq!(cache.label_for_position(&partition, 3)?, 1);
//! # Ok::<(), lance_kmeans::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod arrow;
pub mod distance;
pub mod error;
pub mod kernels;
pub mod kmeans;
pub mod matrix;
pub mod partition;

pub use error::{Error, Result};
pub use kmeans::{InitialCentroids, KMeanInit, KMeans, KMeansParams};
pub use partition::{PartitionCache, PartitionResult, PartitionRows};
