//! Community detection and modularity optimization.
//!
//! Given a weighted connectivity matrix, find groups of nodes (brain regions)
//! that are densely connected internally and sparsely connected between
//! groups.
//!
//! ## The Modularity Objective
//!
//! Every optimizer here maximizes **modularity** Q, which compares the weight
//! inside communities to the weight expected in a random graph with the same
//! strength sequence:
//!
//! ```text
//! Q = (1/2m) × Σ[A_ij - γ(k_i × k_j)/(2m)] × δ(c_i, c_j)
//! ```
//!
//! Where:
//! - m = total edge weight
//! - A_ij = edge weight between i and j
//! - k_i = strength (weighted degree) of node i
//! - γ = resolution parameter
//! - δ(c_i, c_j) = 1 if i and j are in same community
//!
//! Directed and signed networks change only the null model; see
//! [`Modularity`] for the exact forms.
//!
//! ## The Resolution Parameter γ
//!
//! - **γ = 1**: Standard modularity (default)
//! - **γ > 1**: Smaller communities (higher penalty for merging)
//! - **γ < 1**: Larger communities (lower penalty for merging)
//!
//! ## Algorithms
//!
//! ### Louvain
//!
//! Greedy multilevel optimization from singletons ([Blondel et al. 2008](https://arxiv.org/abs/0803.0476)):
//! local node moves until a fixed point, then collapse communities into
//! super-nodes and repeat.
//!
//! ### Fine-tuning
//!
//! Hill climbing from an existing partition. Each node may move into any
//! occupied community or a new singleton; only strictly improving moves are
//! taken, so Q never decreases.
//!
//! ### Probabilistic tuning
//!
//! Fine-tuning that, with probability `p`, also accepts a non-improving move.
//! Useful to diversify ensembles for consensus clustering.
//!
//! ### Consensus
//!
//! Runs an optimizer many times, thresholds the co-assignment (agreement)
//! matrix and clusters that matrix again until the ensemble stops changing
//! ([Lancichinetti & Fortunato 2012](https://arxiv.org/abs/1203.6093)).
//!
//! ## Randomness
//!
//! Every stochastic step draws from a [`RandomStream`](crate::RandomStream)
//! owned by the call. With a seed set, output is exactly reproducible.
//!
//! ## Usage
//!
//! ```rust
//! use brainmod::community::{CommunityDetection, FineTuner, Louvain};
//! use brainmod::Adjacency;
//! use ndarray::array;
//!
//! let adj = Adjacency::new(array![
//!     [0.0, 1.0, 1.0, 0.0],
//!     [1.0, 0.0, 1.0, 0.0],
//!     [1.0, 1.0, 0.0, 0.1],
//!     [0.0, 0.0, 0.1, 0.0],
//! ])
//! .unwrap();
//!
//! let coarse = Louvain::new().with_seed(7).detect(&adj).unwrap();
//! let tuned = FineTuner::new()
//!     .with_seed(7)
//!     .tune(&adj, Some(&coarse.partition))
//!     .unwrap();
//! assert!(tuned.quality >= coarse.quality);
//! ```
//!
//! ## References
//!
//! - Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! - Newman & Girvan (2004). "Finding and evaluating community structure in networks."
//! - Rubinov & Sporns (2011). "Weight-conserving characterization of complex
//!   functional brain networks."
//! - Lancichinetti & Fortunato (2012). "Consensus clustering in complex networks."

mod consensus;
mod louvain;
pub(crate) mod modularity;
mod moves;
mod traits;
mod tuning;

pub use consensus::{Consensus, ConsensusResult, EnsembleMethod};
pub use louvain::Louvain;
pub use modularity::{modularity, Modularity, NegativeWeighting};
pub use traits::CommunityDetection;
pub use tuning::{FineTuner, ProbabilisticTuner};

use crate::error::ConvergenceWarning;
use crate::partition::community_count;

/// A partition and its modularity.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Canonical labels, `0..k` in order of first appearance.
    pub partition: Vec<usize>,
    /// Modularity Q of `partition`.
    pub quality: f64,
    /// Set when a cap was hit; `partition` is still the best found.
    pub warning: Option<ConvergenceWarning>,
}

impl Detection {
    /// Whether the search reached its fixed point.
    pub fn converged(&self) -> bool {
        self.warning.is_none()
    }

    /// Number of communities.
    pub fn community_count(&self) -> usize {
        community_count(&self.partition)
    }
}
