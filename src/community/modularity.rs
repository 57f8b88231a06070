//! Modularity evaluation and the modularity matrix.
//!
//! Every optimizer in this module searches over the modularity matrix B,
//! defined so that
//!
//! ```text
//! Q = Σ_ij B_ij × δ(c_i, c_j)
//! ```
//!
//! For one non-negative weight layer W with total weight s, out-strengths
//! k_out and in-strengths k_in:
//!
//! ```text
//! B = (W - γ × k_out k_inᵀ / s) / s
//! ```
//!
//! For a symmetric matrix s = 2m and k_out = k_in = k, which is the usual
//! undirected formula. For a directed matrix s = m, giving the
//! `k_i^out k_j^in / m` null model. The kind differences therefore reduce to
//! how layers are formed and combined:
//!
//! - **unsigned**: one layer, the matrix itself
//! - **signed**: positive and negative parts are separate layers with their
//!   own null models, combined as `Q⁺ − Q⁻` ([`NegativeWeighting::Symmetric`])
//!   or `Q⁺ − s⁻/(s⁺ + s⁻) × Q⁻` ([`NegativeWeighting::Asymmetric`],
//!   Rubinov & Sporns 2011)
//!
//! A layer with zero total weight contributes nothing.

use crate::adjacency::{Adjacency, GraphKind};
use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// How the negative layer of a signed network is weighted against the positive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeWeighting {
    /// `Q = Q⁺ − Q⁻`.
    #[default]
    Symmetric,
    /// `Q = Q⁺ − s⁻/(s⁺ + s⁻) × Q⁻`: negative weights matter less when scarce.
    Asymmetric,
}

/// Modularity quality function: null model, resolution and graph kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Modularity {
    /// Resolution parameter (gamma).
    resolution: f64,
    /// Directed/signed capabilities.
    kind: GraphKind,
    /// Signed combination rule; ignored for unsigned kinds.
    negative: NegativeWeighting,
}

impl Modularity {
    /// Undirected, unsigned modularity with resolution 1.
    pub fn new() -> Self {
        Self {
            resolution: 1.0,
            kind: GraphKind::UNDIRECTED,
            negative: NegativeWeighting::Symmetric,
        }
    }

    /// Set resolution parameter.
    ///
    /// Higher values produce smaller communities.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the graph kind.
    pub fn with_kind(mut self, kind: GraphKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set how negative weights are weighted (signed kinds only).
    pub fn with_negative_weighting(mut self, negative: NegativeWeighting) -> Self {
        self.negative = negative;
        self
    }

    /// Resolution parameter.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Graph kind.
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Check parameters against a concrete matrix.
    pub(crate) fn validate(&self, adj: &Adjacency) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution < 0.0 {
            return Err(Error::InvalidParameter {
                name: "resolution",
                message: "must be finite and non-negative",
            });
        }
        if !self.kind.signed && adj.has_negative() {
            return Err(Error::InvalidParameter {
                name: "kind",
                message: "negative weights require signed modularity",
            });
        }
        if !self.kind.directed && !adj.is_symmetric(1e-10) {
            tracing::warn!(n = adj.n(), "undirected modularity on an asymmetric matrix");
        }
        Ok(())
    }

    /// The modularity matrix B of `adj`.
    ///
    /// Not symmetrized: for directed graphs `B_ij != B_ji` in general.
    pub fn matrix(&self, adj: &Adjacency) -> Result<Array2<f64>> {
        self.validate(adj)?;
        let w = adj.weights();
        let n = adj.n();

        if !self.kind.signed {
            return Ok(layer(w.to_owned(), self.resolution)
                .map(|(b, s)| b / s)
                .unwrap_or_else(|| Array2::zeros((n, n))));
        }

        let positive = layer(w.mapv(|x| x.max(0.0)), self.resolution);
        let negative = layer(w.mapv(|x| (-x).max(0.0)), self.resolution);
        let s_pos = positive.as_ref().map_or(0.0, |(_, s)| *s);

        let mut b = Array2::<f64>::zeros((n, n));
        if let Some((b_pos, s)) = positive {
            b.scaled_add(1.0 / s, &b_pos);
        }
        if let Some((b_neg, s)) = negative {
            let scale = match self.negative {
                NegativeWeighting::Symmetric => 1.0 / s,
                NegativeWeighting::Asymmetric => 1.0 / (s_pos + s),
            };
            b.scaled_add(-scale, &b_neg);
        }
        Ok(b)
    }

    /// Symmetrized modularity matrix, `(B + Bᵀ) / 2`. Leaves every Q unchanged.
    pub(crate) fn search_matrix(&self, adj: &Adjacency) -> Result<Array2<f64>> {
        let b = self.matrix(adj)?;
        Ok((&b + &b.t()) * 0.5)
    }

    /// Q of `partition` on `adj`.
    ///
    /// Labels need not be contiguous.
    pub fn evaluate(&self, adj: &Adjacency, partition: &[usize]) -> Result<f64> {
        adj.check_partition(partition)?;
        let b = self.matrix(adj)?;
        Ok(quality(b.view(), partition))
    }
}

impl Default for Modularity {
    fn default() -> Self {
        Self::new()
    }
}

/// Undirected, unsigned Q with resolution 1.
///
/// ```rust
/// use brainmod::{modularity, Adjacency};
/// use ndarray::array;
///
/// let adj = Adjacency::new(array![
///     [0.0, 1.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0, 0.0],
///     [0.0, 0.0, 0.0, 1.0],
///     [0.0, 0.0, 1.0, 0.0],
/// ])
/// .unwrap();
/// let q = modularity(&adj, &[0, 0, 1, 1]).unwrap();
/// assert!((q - 0.5).abs() < 1e-12);
/// ```
pub fn modularity(adj: &Adjacency, partition: &[usize]) -> Result<f64> {
    Modularity::new().evaluate(adj, partition)
}

/// `Σ_ij B_ij δ(c_i, c_j)`.
pub(crate) fn quality(b: ArrayView2<'_, f64>, partition: &[usize]) -> f64 {
    let n = partition.len();
    let mut q = 0.0;
    for i in 0..n {
        for j in 0..n {
            if partition[i] == partition[j] {
                q += b[(i, j)];
            }
        }
    }
    q
}

/// `(W - γ k_out k_inᵀ / s, s)` for a non-negative layer, `None` if it has no weight.
fn layer(w: Array2<f64>, resolution: f64) -> Option<(Array2<f64>, f64)> {
    let s = w.sum();
    if s <= 0.0 {
        return None;
    }
    let k_out: Array1<f64> = w.sum_axis(Axis(1));
    let k_in: Array1<f64> = w.sum_axis(Axis(0));
    let n = w.nrows();
    let mut b = w;
    for i in 0..n {
        for j in 0..n {
            b[(i, j)] -= resolution * k_out[i] * k_in[j] / s;
        }
    }
    Some((b, s))
}
