// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Distance metrics
//!
//! Clustering only needs the Euclidean (L2) distance. The scalar loops are
//! written so the compiler can auto-vectorize them.

pub mod l2;

pub use l2::*;
