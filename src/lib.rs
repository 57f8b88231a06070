//! # brainmod
//!
//! Community detection and modularity optimization for brain connectivity
//! networks: weighted or binary, directed or undirected, signed or unsigned
//! adjacency matrices.
//!
//! - [`Modularity`]: quality score Q of a partition
//! - [`Louvain`]: greedy multilevel modularity maximization
//! - [`FineTuner`] / [`ProbabilisticTuner`]: local refinement of a partition
//! - [`Consensus`]: stable partition from an ensemble of runs
//! - [`partition_distance`]: variation of information and NMI
//!
//! Every stochastic operation takes a seed (or an explicit [`RandomStream`]);
//! the same seed gives the same partition.
//!
//! ```rust
//! use brainmod::{partition_distance, Adjacency, CommunityDetection, Consensus, Louvain};
//! use ndarray::Array2;
//!
//! // Two 4-node modules joined by one weak connection.
//! let mut w = Array2::zeros((8, 8));
//! for m in 0..2 {
//!     for i in 0..4 {
//!         for j in 0..4 {
//!             if i != j {
//!                 w[(4 * m + i, 4 * m + j)] = 1.0;
//!             }
//!         }
//!     }
//! }
//! w[(3, 4)] = 0.2;
//! w[(4, 3)] = 0.2;
//! let adj = Adjacency::new(w).unwrap();
//!
//! let single = Louvain::new().with_seed(1).detect(&adj).unwrap();
//! let stable = Consensus::new(0.5, 10).with_seed(1).run(&adj).unwrap();
//! let d = partition_distance(&single.partition, &stable.partition).unwrap();
//! assert_eq!(d.vi, 0.0);
//! ```
//!
//! **Features**: `parallel` (default) builds consensus ensembles on the rayon
//! thread pool; results are identical either way.

pub mod adjacency;
pub mod community;
/// Error types used across `brainmod`.
pub mod error;
pub mod metrics;
pub mod partition;
pub mod random;

#[cfg(test)]
mod scenario_tests;

pub use adjacency::{Adjacency, GraphKind};
pub use community::{
    modularity, CommunityDetection, Consensus, ConsensusResult, Detection, EnsembleMethod,
    FineTuner, Louvain, Modularity, NegativeWeighting, ProbabilisticTuner,
};
pub use error::{ConvergenceWarning, Error, Result, Stage};
pub use metrics::{normalized_partition_distance, partition_distance, PartitionDistance};
pub use random::RandomStream;
