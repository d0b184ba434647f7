// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Partition rows backed by Apache Arrow arrays.
//!
//! Vectors come from a `List`, `LargeList` or `FixedSizeList` column of
//! `Float32` or `Float64`. Each array is one partition.

use std::borrow::Cow;

use arrow_array::cast::AsArray;
use arrow_array::types::{Float32Type, Float64Type};
use arrow_array::{Array, ArrayRef, UInt32Array};
use arrow_buffer::{NullBuffer, ScalarBuffer};
use arrow_schema::DataType;

use crate::kmeans::{InitialCentroids, KMeansParams};
use crate::partition::{PartitionCache, PartitionRows};
use crate::{Error, Result};

fn is_float(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Float32 | DataType::Float64)
}

/// The child type of a list of floats, if `data_type` is one.
fn vector_value_type(data_type: &DataType) -> Option<&DataType> {
    match data_type {
        DataType::List(field) | DataType::LargeList(field) | DataType::FixedSizeList(field, _)
            if is_float(field.data_type()) =>
        {
            Some(field.data_type())
        }
        _ => None,
    }
}

/// A partition whose row vectors live in one Arrow list array.
#[derive(Debug, Clone)]
pub struct ArrowPartition {
    vectors: ArrayRef,
    k: i64,
    initial_centroids: Option<ArrayRef>,
}

impl ArrowPartition {
    /// Wrap a column of vectors.
    ///
    /// Fails with [`Error::InvalidInput`] unless `vectors` is a list of floats.
    pub fn try_new(vectors: ArrayRef, k: i64) -> Result<Self> {
        if vector_value_type(vectors.data_type()).is_none() {
            return Err(Error::invalid_input(format!(
                "vectors must be a list of Float32 or Float64 without nesting, got {}",
                vectors.data_type()
            )));
        }
        Ok(Self {
            vectors,
            k,
            initial_centroids: None,
        })
    }

    /// Centroids to start from, as a flat float array or a list of float lists.
    pub fn with_initial_centroids(mut self, centroids: ArrayRef) -> Self {
        self.initial_centroids = Some(centroids);
        self
    }

    pub fn vectors(&self) -> &ArrayRef {
        &self.vectors
    }

    /// The row's `[start, end)` range in the child array.
    fn value_range(&self, row: usize) -> (usize, usize) {
        match self.vectors.data_type() {
            DataType::List(_) => {
                let offsets = self.vectors.as_list::<i32>().value_offsets();
                (offsets[row] as usize, offsets[row + 1] as usize)
            }
            DataType::LargeList(_) => {
                let offsets = self.vectors.as_list::<i64>().value_offsets();
                (offsets[row] as usize, offsets[row + 1] as usize)
            }
            _ => {
                let fsl = self.vectors.as_fixed_size_list();
                let start = fsl.value_offset(row) as usize;
                (start, start + fsl.value_length() as usize)
            }
        }
    }

    fn child(&self) -> &ArrayRef {
        match self.vectors.data_type() {
            DataType::List(_) => self.vectors.as_list::<i32>().values(),
            DataType::LargeList(_) => self.vectors.as_list::<i64>().values(),
            _ => self.vectors.as_fixed_size_list().values(),
        }
    }
}

fn has_null_in(nulls: Option<&NullBuffer>, start: usize, end: usize) -> bool {
    nulls.is_some_and(|nulls| (start..end).any(|i| nulls.is_null(i)))
}

impl PartitionRows for ArrowPartition {
    fn num_rows(&self) -> usize {
        self.vectors.len()
    }

    fn row_vector(&self, row: usize) -> Result<Option<Cow<'_, [f64]>>> {
        if self.vectors.is_null(row) {
            return Ok(None);
        }
        let (start, end) = self.value_range(row);
        let child = self.child();
        if has_null_in(child.nulls(), start, end) {
            return Err(Error::invalid_input(format!(
                "row {} contains NULL elements",
                row
            )));
        }
        let values = match child.data_type() {
            DataType::Float64 => {
                Cow::Borrowed(&child.as_primitive::<Float64Type>().values()[start..end])
            }
            DataType::Float32 => Cow::Owned(
                child.as_primitive::<Float32Type>().values()[start..end]
                    .iter()
                    .map(|&v| f64::from(v))
                    .collect(),
            ),
            dt => {
                return Err(Error::invalid_input(format!(
                    "row {} must be a 1d float vector, got elements of {}",
                    row, dt
                )))
            }
        };
        Ok(Some(values))
    }

    fn num_clusters(&self) -> Result<usize> {
        usize::try_from(self.k).map_err(|_| {
            Error::invalid_input(format!(
                "the number of clusters must be positive, got {}",
                self.k
            ))
        })
    }

    fn initial_centroids(&self) -> Result<Option<InitialCentroids>> {
        let Some(centroids) = self.initial_centroids.as_ref() else {
            return Ok(None);
        };
        if let Some(values) = float_values(centroids) {
            return Ok(Some(InitialCentroids::Flat(values)));
        }
        let groups = match centroids.data_type() {
            DataType::List(_) => nested_float_values(centroids.as_list::<i32>().iter()),
            DataType::LargeList(_) => nested_float_values(centroids.as_list::<i64>().iter()),
            DataType::FixedSizeList(_, _) => {
                nested_float_values(centroids.as_fixed_size_list().iter())
            }
            _ => None,
        };
        groups.map(|groups| Some(InitialCentroids::Nested(groups))).ok_or_else(|| {
            Error::invalid_initial_centroids(format!(
                "centroids must be a 1d or 2d float array, got {}",
                centroids.data_type()
            ))
        })
    }
}

/// Values of a flat float array, `None` for nulls.
fn float_values(array: &dyn Array) -> Option<Vec<Option<f64>>> {
    match array.data_type() {
        DataType::Float64 => Some(array.as_primitive::<Float64Type>().iter().collect()),
        DataType::Float32 => Some(
            array
                .as_primitive::<Float32Type>()
                .iter()
                .map(|v| v.map(f64::from))
                .collect(),
        ),
        _ => None,
    }
}

fn nested_float_values(
    groups: impl Iterator<Item = Option<ArrayRef>>,
) -> Option<Vec<Option<Vec<Option<f64>>>>> {
    groups
        .map(|group| match group {
            Some(group) => float_values(&group).map(Some),
            None => Some(None),
        })
        .collect()
}

/// Label every row of a partition, one row at a time.
///
/// The rows are queried through a single [`PartitionCache`], the way a
/// row-at-a-time caller would, so the partition is clustered exactly once.
pub fn kmeans_labels<R: PartitionRows + ?Sized>(
    rows: &R,
    params: KMeansParams,
) -> Result<UInt32Array> {
    let mut cache = PartitionCache::new(params);
    let labels = (0..rows.num_rows())
        .map(|position| cache.label_for_position(rows, position))
        .collect::<Result<Vec<_>>>()?;
    Ok(UInt32Array::try_new(ScalarBuffer::from(labels), None)?)
}
