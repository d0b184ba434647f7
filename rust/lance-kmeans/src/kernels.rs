// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

use num_traits::Float;

/// Returns the minimal value (float) and the index (argmin) from an Iterator.
///
/// The first element always seeds the minimum, and a later element only
/// replaces it when strictly smaller. Ties therefore resolve to the lowest
/// index, and a `NaN` never displaces an earlier value.
///
/// Return `None` only if the iterator is empty.
#[inline]
pub fn argmin_value_float<T: Float>(mut iter: impl Iterator<Item = T>) -> Option<(u32, T)> {
    let mut min_value = iter.next()?;
    let mut min_idx = 0_u32;
    for (idx, value) in iter.enumerate() {
        if value < min_value {
            min_value = value;
            min_idx = idx as u32 + 1;
        }
    }
    Some((min_idx, min_value))
}

/// Argmin over a float iterator. Fused the operation in iterator to avoid memory allocation.
///
/// Returns the index of the min value.
#[inline]
pub fn argmin<T: Float>(iter: impl Iterator<Item = T>) -> Option<u32> {
    argmin_value_float(iter).map(|(idx, _)| idx)
}
