//! Partition utilities: canonical labels, member lists and co-assignment.

use crate::error::{Error, Result};
use ndarray::Array2;
use std::collections::HashMap;

/// Relabel to `0..k` in order of first appearance.
///
/// Two partitions that group nodes the same way canonicalize to the same
/// vector, so equality of canonical forms is equality of partitions.
///
/// ```rust
/// use brainmod::partition::canonicalize;
///
/// assert_eq!(canonicalize(&[7, 7, 3, 9, 3]), vec![0, 0, 1, 2, 1]);
/// ```
pub fn canonicalize(labels: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|&c| {
            let next = mapping.len();
            *mapping.entry(c).or_insert(next)
        })
        .collect()
}

/// Number of distinct labels.
pub fn community_count(labels: &[usize]) -> usize {
    let mut unique: Vec<usize> = labels.to_vec();
    unique.sort_unstable();
    unique.dedup();
    unique.len()
}

/// Member lists, one per community, in canonical label order.
pub fn labels_to_groups(labels: &[usize]) -> Vec<Vec<usize>> {
    let canonical = canonicalize(labels);
    let k = canonical.iter().copied().max().map_or(0, |m| m + 1);
    let mut groups = vec![Vec::new(); k];
    for (node, &c) in canonical.iter().enumerate() {
        groups[c].push(node);
    }
    groups
}

/// Inverse of [`labels_to_groups`]: every node in `0..n` must appear exactly once.
pub fn groups_to_labels(groups: &[Vec<usize>], n: usize) -> Result<Vec<usize>> {
    let mut labels = vec![usize::MAX; n];
    for (c, members) in groups.iter().enumerate() {
        for &node in members {
            if node >= n || labels[node] != usize::MAX {
                return Err(Error::InvalidParameter {
                    name: "groups",
                    message: "every node must appear in exactly one group",
                });
            }
            labels[node] = c;
        }
    }
    if labels.contains(&usize::MAX) {
        return Err(Error::InvalidParameter {
            name: "groups",
            message: "every node must appear in exactly one group",
        });
    }
    Ok(canonicalize(&labels))
}

/// Co-assignment counts: entry (i, j) is the number of partitions placing
/// i and j in the same community. The diagonal is zero.
pub fn agreement_counts(ensemble: &[Vec<usize>]) -> Result<Array2<u32>> {
    let n = ensemble.first().map(Vec::len).ok_or(Error::EmptyInput)?;
    ensemble_size(ensemble.len())?;
    let mut counts = Array2::<u32>::zeros((n, n));
    for partition in ensemble {
        add_agreement(&mut counts, partition)?;
    }
    Ok(counts)
}

/// Co-assignment fractions over the ensemble, the agreement matrix.
pub fn agreement(ensemble: &[Vec<usize>]) -> Result<Array2<f64>> {
    let counts = agreement_counts(ensemble)?;
    let reps = ensemble.len() as f64;
    Ok(counts.mapv(|c| f64::from(c) / reps))
}

/// Ensemble size as the integer type agreement is counted in.
pub(crate) fn ensemble_size(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InvalidParameter {
        name: "ensemble",
        message: "too many partitions to count agreement",
    })
}

pub(crate) fn add_agreement(counts: &mut Array2<u32>, partition: &[usize]) -> Result<()> {
    let n = counts.nrows();
    if partition.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: partition.len(),
        });
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if partition[i] == partition[j] {
                counts[(i, j)] += 1;
                counts[(j, i)] += 1;
            }
        }
    }
    Ok(())
}
