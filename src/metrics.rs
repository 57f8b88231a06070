//! Information-theoretic comparison of partitions.
//!
//! Both measures come from the contingency table of two partitions: the
//! number of nodes shared by every (community in A, community in B) pair.
//! From it, with natural logarithms and `0 × ln 0 = 0`:
//!
//! ```text
//! H(A)   = -Σ_a p(a) ln p(a)
//! H(A,B) = -Σ_ab p(a,b) ln p(a,b)
//! I(A;B) = H(A) + H(B) - H(A,B)
//! ```
//!
//! | Measure | Formula | Identical partitions |
//! |---------|---------|----------------------|
//! | [`partition_distance`] VI | 2·H(A,B) − H(A) − H(B) | 0 |
//! | [`partition_distance`] NMI | 1 − VI / H(A,B) | 1 |
//! | [`normalized_partition_distance`] VI | VI / ln n | 0 |
//! | [`normalized_partition_distance`] NMI | 2·I(A;B) / (H(A) + H(B)) | 1 |
//!
//! VI is a metric on partitions: symmetric, zero only for identical
//! partitions, and it obeys the triangle inequality.
//!
//! # References
//!
//! - Meilă (2007). "Comparing clusterings: an information based distance."
//! - Danon et al. (2005). "Comparing community structure identification."

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Variation of information and normalized mutual information of two partitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionDistance {
    /// Variation of information (0 for identical partitions).
    pub vi: f64,
    /// Normalized mutual information (1 for identical partitions).
    pub nmi: f64,
}

/// VI and NMI between `a` and `b`.
///
/// Labels need not be contiguous or share values between the two partitions.
/// When both partitions put every node in one community, `H(A,B) = 0` and the
/// result is `VI = 0`, `NMI = 1`.
///
/// ```rust
/// use brainmod::partition_distance;
///
/// let same = partition_distance(&[1, 1, 2], &[5, 5, 0]).unwrap();
/// assert_eq!(same.vi, 0.0);
/// assert_eq!(same.nmi, 1.0);
///
/// let apart = partition_distance(&[1, 1, 1], &[1, 2, 3]).unwrap();
/// assert!(apart.vi > 0.0);
/// assert!(apart.nmi < 1.0);
/// ```
pub fn partition_distance(a: &[usize], b: &[usize]) -> Result<PartitionDistance> {
    let h = Entropies::of(a, b)?;
    if h.joint <= 0.0 {
        return Ok(PartitionDistance { vi: 0.0, nmi: 1.0 });
    }
    let vi = h.variation();
    Ok(PartitionDistance {
        vi,
        nmi: 1.0 - vi / h.joint,
    })
}

/// VI normalized by `ln n` and NMI as `2 I(A;B) / (H(A) + H(B))`.
///
/// Both lie in [0, 1]; this is the normalization customary in connectomics
/// toolboxes.
pub fn normalized_partition_distance(a: &[usize], b: &[usize]) -> Result<PartitionDistance> {
    let h = Entropies::of(a, b)?;
    let ln_n = (h.n as f64).ln();
    let vi = if ln_n > 0.0 { h.variation() / ln_n } else { 0.0 };
    let marginals = h.a + h.b;
    let nmi = if marginals > 0.0 {
        2.0 * (marginals - h.joint) / marginals
    } else {
        1.0
    };
    Ok(PartitionDistance { vi, nmi })
}

/// Marginal and joint entropies of two partitions.
#[derive(Debug, Clone, Copy)]
struct Entropies {
    a: f64,
    b: f64,
    joint: f64,
    n: usize,
}

impl Entropies {
    fn of(a: &[usize], b: &[usize]) -> Result<Self> {
        if a.len() != b.len() {
            return Err(Error::DimensionMismatch {
                expected: a.len(),
                found: b.len(),
            });
        }
        if a.is_empty() {
            return Err(Error::EmptyInput);
        }

        let (joint, n) = build_contingency_table(a, b);
        let mut count_a: HashMap<usize, usize> = HashMap::new();
        let mut count_b: HashMap<usize, usize> = HashMap::new();
        for (&(x, y), &c) in &joint {
            *count_a.entry(x).or_insert(0) += c;
            *count_b.entry(y).or_insert(0) += c;
        }

        Ok(Self {
            a: entropy(count_a.into_values().collect(), n),
            b: entropy(count_b.into_values().collect(), n),
            joint: entropy(joint.into_values().collect(), n),
            n,
        })
    }

    /// `2 H(A,B) - (H(A) + H(B))`, clamped at zero against rounding.
    fn variation(&self) -> f64 {
        (2.0 * self.joint - (self.a + self.b)).max(0.0)
    }
}

/// Shannon entropy of a count distribution.
///
/// Counts are summed in sorted order so equal multisets give bit-identical
/// entropies regardless of hash order.
fn entropy(mut counts: Vec<usize>, n: usize) -> f64 {
    counts.sort_unstable();
    let n_f = n as f64;
    counts
        .into_iter()
        .filter(|&c| c > 0)
        .map(|c| {
            let p = c as f64 / n_f;
            -p * p.ln()
        })
        .sum()
}

fn build_contingency_table(a: &[usize], b: &[usize]) -> (HashMap<(usize, usize), usize>, usize) {
    let mut joint: HashMap<(usize, usize), usize> = HashMap::new();
    for (&x, &y) in a.iter().zip(b.iter()) {
        *joint.entry((x, y)).or_insert(0) += 1;
    }
    (joint, a.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_partitions() {
        let d = partition_distance(&[1, 1, 2], &[1, 1, 2]).unwrap();
        assert_eq!(d.vi, 0.0);
        assert_eq!(d.nmi, 1.0);
    }

    #[test]
    fn test_permuted_labels() {
        let d = partition_distance(&[0, 0, 1, 1, 2], &[2, 2, 0, 0, 1]).unwrap();
        assert_eq!(d.vi, 0.0);
        assert_eq!(d.nmi, 1.0);
    }

    #[test]
    fn test_merged_versus_separated() {
        let d = partition_distance(&[1, 1, 1], &[1, 2, 3]).unwrap();
        // H(A) = 0, H(B) = H(A,B) = ln 3
        assert!((d.vi - 3f64.ln()).abs() < 1e-12);
        assert!(d.nmi.abs() < 1e-12);
    }

    #[test]
    fn test_both_degenerate() {
        let d = partition_distance(&[4, 4, 4, 4], &[0, 0, 0, 0]).unwrap();
        assert_eq!(d, PartitionDistance { vi: 0.0, nmi: 1.0 });
    }

    #[test]
    fn test_known_value() {
        // A = {0,1},{2,3}; B = {0},{1,2,3}
        // H(A) = ln 2, H(B) = -(1/4 ln 1/4 + 3/4 ln 3/4), H(A,B) = -(1/4 ln 1/4 + 1/4 ln 1/4 + 1/2 ln 1/2)
        let a = [0, 0, 1, 1];
        let b = [0, 1, 1, 1];
        let h_a = 2f64.ln();
        let h_b = -(0.25 * 0.25f64.ln() + 0.75 * 0.75f64.ln());
        let h_ab = -(2.0 * 0.25 * 0.25f64.ln() + 0.5 * 0.5f64.ln());
        let d = partition_distance(&a, &b).unwrap();
        assert!((d.vi - (2.0 * h_ab - h_a - h_b)).abs() < 1e-12);
        assert!((d.nmi - (1.0 - d.vi / h_ab)).abs() < 1e-12);

        let n = normalized_partition_distance(&a, &b).unwrap();
        assert!((n.vi - d.vi / 4f64.ln()).abs() < 1e-12);
        assert!((n.nmi - 2.0 * (h_a + h_b - h_ab) / (h_a + h_b)).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_bounds() {
        let n = normalized_partition_distance(&[0, 0, 0, 0], &[0, 1, 2, 3]).unwrap();
        // VI = ln 4 = ln n
        assert!((n.vi - 1.0).abs() < 1e-12);
        assert!(n.nmi.abs() < 1e-12);

        let single = normalized_partition_distance(&[3], &[8]).unwrap();
        assert_eq!(single, PartitionDistance { vi: 0.0, nmi: 1.0 });
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            partition_distance(&[0, 1], &[0]),
            Err(Error::DimensionMismatch { expected: 2, found: 1 })
        );
        assert_eq!(partition_distance(&[], &[]), Err(Error::EmptyInput));
    }

    fn labels(n: usize) -> impl Strategy<Value = Vec<usize>> {
        proptest::collection::vec(0usize..5, n)
    }

    proptest! {
        #[test]
        fn vi_is_zero_on_self(p in (1usize..30).prop_flat_map(labels)) {
            let d = partition_distance(&p, &p).unwrap();
            prop_assert_eq!(d.vi, 0.0);
            prop_assert_eq!(d.nmi, 1.0);
        }

        #[test]
        fn vi_is_symmetric(
            (a, b) in (1usize..30).prop_flat_map(|n| (labels(n), labels(n)))
        ) {
            let ab = partition_distance(&a, &b).unwrap();
            let ba = partition_distance(&b, &a).unwrap();
            prop_assert_eq!(ab.vi, ba.vi);
            prop_assert_eq!(ab.nmi, ba.nmi);
            prop_assert!(ab.vi >= 0.0);
            prop_assert!(ab.nmi <= 1.0 + 1e-12);
        }
    }
}
