// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array};
use lance_kmeans::arrow::{kmeans_labels, ArrowPartition};
use lance_kmeans::matrix::DenseMatrix;
use lance_kmeans::{Error, KMeanInit, KMeans, KMeansParams, PartitionCache, PartitionRows};
use lance_kmeans_testing::datagen::{fixed_size_vectors, generate_blobs, list_vectors};
use rstest::rstest;

fn supplied() -> KMeansParams {
    KMeansParams {
        init: KMeanInit::Supplied,
        ..Default::default()
    }
}

fn groups(labels: &[u32]) -> Vec<Vec<usize>> {
    let k = labels.iter().max().map_or(0, |&m| m as usize + 1);
    let mut groups = vec![vec![]; k];
    for (row, &label) in labels.iter().enumerate() {
        groups[label as usize].push(row);
    }
    groups.retain(|g| !g.is_empty());
    groups.sort();
    groups
}

#[test_log::test]
fn test_one_dimension_two_clusters() {
    let vectors = fixed_size_vectors(vec![1.0, 2.0, 9.0, 10.0], 1);
    let partition = ArrowPartition::try_new(Arc::new(vectors), 2).unwrap();
    let labels = kmeans_labels(&partition, KMeansParams::default()).unwrap();
    assert_eq!(groups(labels.values()), vec![vec![0, 1], vec![2, 3]]);
}

#[test]
fn test_rows_queried_in_any_order() {
    let values = generate_blobs(&[0.0, 0.0, 0.0, 40.0, 40.0, 40.0], 3, 25, 2.0, 7);
    let partition = ArrowPartition::try_new(Arc::new(fixed_size_vectors(values, 3)), 2).unwrap();

    let in_order = kmeans_labels(&partition, KMeansParams::default()).unwrap();

    let mut cache = PartitionCache::default();
    for position in (0..50).rev() {
        let label = cache.label_for_position(&partition, position).unwrap();
        assert_eq!(label, in_order.value(position));
        assert_eq!(cache.label_for_position(&partition, position).unwrap(), label);
    }
    assert_eq!(
        groups(in_order.values()),
        vec![(0..25).collect::<Vec<_>>(), (25..50).collect::<Vec<_>>()]
    );
}

#[test]
fn test_result_is_fixed_point() {
    let offsets = [(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0), (0.5, 0.5), (-0.5, -0.5)];
    let values = [(0.0, 0.0), (14.0, 16.0), (30.0, 28.0)]
        .iter()
        .flat_map(|(cx, cy)| offsets.iter().flat_map(move |(ox, oy)| [cx + ox, cy + oy]))
        .collect::<Vec<f64>>();
    let partition =
        ArrowPartition::try_new(Arc::new(fixed_size_vectors(values.clone(), 2)), 3).unwrap();
    let mut cache = PartitionCache::default();
    cache.label_for_position(&partition, 0).unwrap();
    let labels = cache.result().unwrap().labels().to_vec();
    assert_eq!(
        groups(&labels),
        vec![
            (0..6).collect::<Vec<_>>(),
            (6..12).collect::<Vec<_>>(),
            (12..18).collect::<Vec<_>>()
        ]
    );

    // Means of the final clusters reproduce the same assignment.
    let data = DenseMatrix::new(&values, 2);
    let mut kmeans = KMeans::with_centroids(vec![0.0; 6], 2);
    kmeans.update_centroids(&data, &labels);
    assert_eq!(kmeans.compute_membership(&data), labels);
}

#[test]
fn test_single_row_single_cluster() {
    let vectors = list_vectors(vec![Some(vec![Some(-3.0), Some(8.0), Some(0.25)])]);
    let partition = ArrowPartition::try_new(Arc::new(vectors), 1).unwrap();
    let mut cache = PartitionCache::default();
    assert_eq!(cache.label_for_position(&partition, 0).unwrap(), 0);
    assert_eq!(cache.result().unwrap().iterations(), 1);
    assert!(cache.result().unwrap().converged());
}

#[rstest]
#[case::flat(Arc::new(Float64Array::from(vec![0.0, 0.0, 5.0, 5.0])) as ArrayRef)]
#[case::nested(Arc::new(fixed_size_vectors(vec![0.0, 0.0, 5.0, 5.0], 2)) as ArrayRef)]
fn test_centroids_shape_mismatch(#[case] centroids: ArrayRef) {
    let vectors = fixed_size_vectors(vec![0.0, 0.0, 1.0, 1.0, 6.0, 6.0], 2);
    let partition = ArrowPartition::try_new(Arc::new(vectors), 3)
        .unwrap()
        .with_initial_centroids(centroids);
    let err = kmeans_labels(&partition, supplied()).unwrap_err();
    assert!(matches!(err, Error::InvalidInitialCentroids { .. }), "{err}");
}

#[rstest]
#[case::one_dimension(vec![1.0, 2.0], 1)]
#[case::two_dimensions(vec![1.0, 2.0, 3.0, 4.0], 2)]
fn test_oversized_k_is_an_error(#[case] values: Vec<f64>, #[case] dimension: i32) {
    let partition =
        ArrowPartition::try_new(Arc::new(fixed_size_vectors(values, dimension)), i64::MAX).unwrap();
    let err = kmeans_labels(&partition, KMeansParams::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }), "{err}");

    let partition = partition.with_initial_centroids(Arc::new(Float64Array::from(vec![0.0; 4])));
    let err = kmeans_labels(&partition, supplied()).unwrap_err();
    assert!(matches!(err, Error::InvalidInitialCentroids { .. }), "{err}");
}

#[test]
fn test_centroids_with_null_element() {
    let vectors = fixed_size_vectors(vec![0.0, 1.0], 1);
    let partition = ArrowPartition::try_new(Arc::new(vectors), 2)
        .unwrap()
        .with_initial_centroids(Arc::new(Float64Array::from(vec![Some(0.0), None])));
    let err = kmeans_labels(&partition, supplied()).unwrap_err();
    assert!(matches!(err, Error::InvalidInitialCentroids { .. }), "{err}");
}

#[test]
fn test_short_row_aborts_partition() {
    let vectors = list_vectors(vec![
        Some(vec![Some(1.0), Some(2.0), Some(3.0)]),
        Some(vec![Some(1.0), Some(2.0)]),
        Some(vec![Some(4.0), Some(5.0), Some(6.0)]),
    ]);
    let partition = ArrowPartition::try_new(Arc::new(vectors), 2).unwrap();
    let mut cache = PartitionCache::default();
    for position in [0, 2] {
        let err = cache.label_for_position(&partition, position).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }), "{err}");
        assert!(!cache.is_done());
    }
    assert!(kmeans_labels(&partition, KMeansParams::default()).is_err());
}

#[test]
fn test_null_row_aborts_partition() {
    let vectors = list_vectors(vec![Some(vec![Some(1.0)]), None]);
    let partition = ArrowPartition::try_new(Arc::new(vectors), 1).unwrap();
    assert_eq!(partition.num_rows(), 2);
    let err = kmeans_labels(&partition, KMeansParams::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }), "{err}");
}

#[test]
fn test_partitions_are_independent() {
    let first = ArrowPartition::try_new(
        Arc::new(fixed_size_vectors(vec![1.0, 2.0, 9.0, 10.0], 1)),
        2,
    )
    .unwrap();
    let second = ArrowPartition::try_new(
        Arc::new(fixed_size_vectors(vec![100.0, 90.0, 2.0, 1.0], 1)),
        2,
    )
    .unwrap();

    let mut first_cache = PartitionCache::default();
    let mut second_cache = PartitionCache::default();
    assert_eq!(first_cache.label_for_position(&first, 0).unwrap(), 0);
    assert_eq!(second_cache.label_for_position(&second, 0).unwrap(), 1);
    assert_eq!(first_cache.result().unwrap().labels(), &[0, 0, 1, 1]);
    assert_eq!(second_cache.result().unwrap().labels(), &[1, 1, 0, 0]);
}
