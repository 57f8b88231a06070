//! Validated adjacency matrices.
//!
//! Every algorithm in this crate reads a dense, square, finite weight matrix.
//! [`Adjacency`] checks those invariants once at construction so the search
//! code can assume them; a NaN that slipped through would otherwise poison
//! every Q value computed downstream.

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};
use petgraph::graph::{Graph, IndexType};
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;

/// Dense N×N weight matrix, N ≥ 1, all entries finite.
///
/// Zero means no edge. Entries may be negative (signed networks) and the
/// matrix need not be symmetric (directed networks).
#[derive(Debug, Clone, PartialEq)]
pub struct Adjacency {
    weights: Array2<f64>,
}

impl Adjacency {
    /// Wrap a weight matrix after checking shape and finiteness.
    pub fn new(weights: Array2<f64>) -> Result<Self> {
        let (rows, cols) = weights.dim();
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyInput);
        }
        if rows != cols {
            return Err(Error::ShapeMismatch {
                expected: format!("{rows}x{rows}"),
                actual: format!("{rows}x{cols}"),
            });
        }
        if let Some(((row, col), _)) = weights.indexed_iter().find(|(_, w)| !w.is_finite()) {
            return Err(Error::NonFinite { row, col });
        }
        Ok(Self { weights })
    }

    /// Build from row-major data of an `n`×`n` matrix.
    pub fn from_shape_vec(n: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n * n {
            return Err(Error::DimensionMismatch {
                expected: n * n,
                found: data.len(),
            });
        }
        let weights = Array2::from_shape_vec((n, n), data).map_err(|e| Error::ShapeMismatch {
            expected: format!("{n}x{n}"),
            actual: e.to_string(),
        })?;
        Self::new(weights)
    }

    /// Build from a petgraph graph, reading each edge weight with `weight`.
    ///
    /// Undirected edges fill both (i, j) and (j, i); parallel edges add up.
    pub fn from_graph<N, E, Ty, Ix>(
        graph: &Graph<N, E, Ty, Ix>,
        weight: impl Fn(&E) -> f64,
    ) -> Result<Self>
    where
        Ty: EdgeType,
        Ix: IndexType,
    {
        let n = graph.node_count();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        let mut weights = Array2::<f64>::zeros((n, n));
        for edge in graph.edge_references() {
            let i = edge.source().index();
            let j = edge.target().index();
            let w = weight(edge.weight());
            weights[(i, j)] += w;
            if !graph.is_directed() && i != j {
                weights[(j, i)] += w;
            }
        }
        Self::new(weights)
    }

    /// Number of nodes.
    pub fn n(&self) -> usize {
        self.weights.nrows()
    }

    /// Read-only view of the weights.
    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Consume into the underlying matrix.
    pub fn into_inner(self) -> Array2<f64> {
        self.weights
    }

    /// Whether any entry is negative.
    pub fn has_negative(&self) -> bool {
        self.weights.iter().any(|&w| w < 0.0)
    }

    /// Whether `W == W^T` up to `tol`.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        let n = self.n();
        (0..n).all(|i| (i + 1..n).all(|j| (self.weights[(i, j)] - self.weights[(j, i)]).abs() <= tol))
    }

    /// Check that a partition assigns exactly one label per node.
    pub(crate) fn check_partition(&self, partition: &[usize]) -> Result<()> {
        if partition.len() != self.n() {
            return Err(Error::DimensionMismatch {
                expected: self.n(),
                found: partition.len(),
            });
        }
        Ok(())
    }
}

/// Capability descriptor selecting the null model.
///
/// All kinds share one algorithm; only the modularity matrix differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphKind {
    /// Use out-/in-degree null model (`k_i^out k_j^in / m`).
    pub directed: bool,
    /// Split positive and negative weights into separate null models.
    pub signed: bool,
}

impl GraphKind {
    /// Undirected, unsigned.
    pub const UNDIRECTED: Self = Self {
        directed: false,
        signed: false,
    };
    /// Directed, unsigned.
    pub const DIRECTED: Self = Self {
        directed: true,
        signed: false,
    };
    /// Undirected, signed.
    pub const SIGNED: Self = Self {
        directed: false,
        signed: true,
    };
}
