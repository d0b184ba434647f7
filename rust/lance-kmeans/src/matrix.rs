// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

use std::borrow::Cow;

/// Row-major matrix of `f64` vectors stored in one flat buffer.
///
/// Element `(row, d)` lives at `row * dimension + d`.
#[derive(Debug, Clone)]
pub struct DenseMatrix<'a> {
    data: Cow<'a, [f64]>,
    dimension: usize,
}

impl<'a> DenseMatrix<'a> {
    /// Borrow an existing flat buffer.
    ///
    /// # Panics
    ///
    /// Panics if `dimension` is zero or does not divide `data.len()`.
    pub fn new(data: &'a [f64], dimension: usize) -> Self {
        assert!(dimension > 0, "dimension must be positive");
        assert_eq!(data.len() % dimension, 0);
        Self {
            data: Cow::Borrowed(data),
            dimension,
        }
    }

    /// Take ownership of a flat buffer.
    ///
    /// # Panics
    ///
    /// Panics if `dimension` is zero or does not divide `data.len()`.
    pub fn new_owned(data: Vec<f64>, dimension: usize) -> Self {
        assert!(dimension > 0, "dimension must be positive");
        assert_eq!(data.len() % dimension, 0);
        Self {
            data: Cow::Owned(data),
            dimension,
        }
    }

    /// An empty owned matrix with room for `num_rows` vectors.
    pub fn with_capacity(dimension: usize, num_rows: usize) -> DenseMatrix<'static> {
        assert!(dimension > 0, "dimension must be positive");
        DenseMatrix {
            data: Cow::Owned(Vec::with_capacity(dimension * num_rows)),
            dimension,
        }
    }

    /// Append one vector.
    pub fn push_row(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.dimension);
        self.data.to_mut().extend_from_slice(row);
    }

    pub fn num_rows(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn num_columns(&self) -> usize {
        self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dimension..(i + 1) * self.dimension]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.dimension)
    }

    /// The flat backing buffer.
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// Per-dimension minimum and maximum over a set of vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMax {
    min: Vec<f64>,
    max: Vec<f64>,
    count: usize,
}

impl MinMax {
    pub fn new(dimension: usize) -> Self {
        Self {
            min: vec![0.0; dimension],
            max: vec![0.0; dimension],
            count: 0,
        }
    }

    /// Fold one vector into the running bounds.
    ///
    /// The first vector initializes both bounds.
    pub fn update(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.min.len());
        if self.count == 0 {
            self.min.copy_from_slice(row);
            self.max.copy_from_slice(row);
        } else {
            for ((min, max), &v) in self.min.iter_mut().zip(self.max.iter_mut()).zip(row) {
                if *max < v {
                    *max = v;
                }
                if *min > v {
                    *min = v;
                }
            }
        }
        self.count += 1;
    }

    pub fn from_matrix(matrix: &DenseMatrix) -> Self {
        let mut min_max = Self::new(matrix.num_columns());
        matrix.iter().for_each(|row| min_max.update(row));
        min_max
    }

    pub fn min(&self) -> &[f64] {
        &self.min
    }

    pub fn max(&self) -> &[f64] {
        &self.max
    }

    pub fn dimension(&self) -> usize {
        self.min.len()
    }

    /// Number of vectors folded in.
    pub fn count(&self) -> usize {
        self.count
    }
}
