//! Consensus clustering over an ensemble of partitions.
//!
//! A single Louvain run depends on its visit order. Consensus clustering runs
//! the optimizer `repetitions` times, records how often each pair of nodes
//! lands in the same community (the agreement matrix), drops agreement below
//! `tau`, and clusters the thresholded agreement matrix again. Rounds repeat
//! until the ensemble is unanimous or the round's partition equals the
//! previous round's.
//!
//! ## Reproducibility
//!
//! Repetition `i` of round `r` uses seed `base + r × repetitions + i`, so round
//! 0 uses `base + i`. Each repetition owns its stream and agreement is an
//! integer count, so the result does not depend on scheduling: the
//! `parallel` feature changes speed, not output.
//!
//! ## References
//!
//! Lancichinetti & Fortunato (2012). "Consensus clustering in complex
//! networks." Scientific Reports 2, 336.

use super::modularity::Modularity;
use super::traits::CommunityDetection;
use super::tuning::{FineTuner, ProbabilisticTuner};
use super::Louvain;
use crate::adjacency::{Adjacency, GraphKind};
use crate::error::{check_positive, check_unit_interval, ConvergenceWarning, Result, Stage};
use crate::partition::{agreement_counts, canonicalize, ensemble_size};
use crate::random::RandomStream;
use ndarray::Array2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Optimizer producing each ensemble member.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EnsembleMethod {
    /// Plain Louvain.
    #[default]
    Louvain,
    /// Louvain followed by fine-tuning with the same seed.
    LouvainFineTuned,
    /// Louvain followed by probabilistic tuning with acceptance `p`.
    ProbabilisticTuned {
        /// Probability of accepting a non-improving move.
        p: f64,
    },
}

/// Consensus clustering configuration.
#[derive(Debug, Clone)]
pub struct Consensus {
    /// Agreement threshold; lower agreement is zeroed.
    tau: f64,
    /// Ensemble size per round.
    repetitions: usize,
    /// Maximum number of agreement rounds.
    max_rounds: usize,
    /// Base seed for derived per-repetition seeds.
    seed: Option<u64>,
    /// Member optimizer.
    method: EnsembleMethod,
    /// Quality function for the first round on the input graph.
    modularity: Modularity,
}

/// Consensus partition with diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusResult {
    /// Canonical consensus partition.
    pub partition: Vec<usize>,
    /// Agreement matrix of the final ensemble (diagonal zero).
    pub agreement: Array2<f64>,
    /// Number of agreement matrices built.
    pub rounds: usize,
    /// Set when `max_rounds` ran out.
    pub warning: Option<ConvergenceWarning>,
}

impl ConsensusResult {
    /// Whether a fixed point was reached within `max_rounds`.
    pub fn converged(&self) -> bool {
        self.warning.is_none()
    }
}

impl Consensus {
    /// Create with threshold `tau` and `repetitions` runs per round.
    pub fn new(tau: f64, repetitions: usize) -> Self {
        Self {
            tau,
            repetitions,
            max_rounds: 100,
            seed: None,
            method: EnsembleMethod::Louvain,
            modularity: Modularity::new(),
        }
    }

    /// Set maximum rounds.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the member optimizer.
    pub fn with_method(mut self, method: EnsembleMethod) -> Self {
        self.method = method;
        self
    }

    /// Set resolution parameter for the first round.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.modularity = self.modularity.with_resolution(resolution);
        self
    }

    /// Set the graph kind of the input (directed / signed).
    pub fn with_kind(mut self, kind: GraphKind) -> Self {
        self.modularity = self.modularity.with_kind(kind);
        self
    }

    /// Replace the first-round quality function.
    pub fn with_modularity(mut self, modularity: Modularity) -> Self {
        self.modularity = modularity;
        self
    }

    /// Build an ensemble on `adj`, then iterate to consensus.
    pub fn run(&self, adj: &Adjacency) -> Result<ConsensusResult> {
        self.validate()?;
        self.modularity.validate(adj)?;
        let base = RandomStream::new(self.seed).seed();
        let ensemble = self.ensemble(adj, &self.modularity, base)?;
        self.iterate(ensemble, base)
    }

    /// Iterate to consensus starting from an existing ensemble.
    ///
    /// A unanimous ensemble (including a single partition) is returned as is.
    pub fn from_ensemble(&self, ensemble: &[Vec<usize>]) -> Result<ConsensusResult> {
        self.validate()?;
        let base = RandomStream::new(self.seed).seed();
        self.iterate(ensemble.to_vec(), base)
    }

    fn validate(&self) -> Result<()> {
        check_unit_interval("tau", self.tau)?;
        check_positive("repetitions", self.repetitions)?;
        check_positive("max_rounds", self.max_rounds)?;
        if let EnsembleMethod::ProbabilisticTuned { p } = self.method {
            check_unit_interval("p", p)?;
        }
        Ok(())
    }

    fn iterate(&self, mut ensemble: Vec<Vec<usize>>, base: u64) -> Result<ConsensusResult> {
        // Agreement matrices are unsigned, undirected, standard resolution.
        let agreement_model = Modularity::new();
        let mut previous: Option<Vec<usize>> = None;

        for round in 0..self.max_rounds {
            let (agreement, unanimous) = agreement_of(&ensemble)?;
            let current = canonicalize(&ensemble[0]);
            tracing::debug!(round, members = ensemble.len(), unanimous, "consensus round");

            if unanimous || previous.as_ref() == Some(&current) {
                return Ok(ConsensusResult {
                    partition: current,
                    agreement,
                    rounds: round + 1,
                    warning: None,
                });
            }

            let tau = self.tau;
            let thresholded = Adjacency::new(agreement.mapv(|d| if d < tau { 0.0 } else { d }))?;
            let offset = (round as u64 + 1).wrapping_mul(self.repetitions as u64);
            ensemble = self.ensemble(&thresholded, &agreement_model, base.wrapping_add(offset))?;
            previous = Some(current);
        }

        let (agreement, _) = agreement_of(&ensemble)?;
        Ok(ConsensusResult {
            partition: canonicalize(&ensemble[0]),
            agreement,
            rounds: self.max_rounds,
            warning: Some(ConvergenceWarning::new(Stage::Rounds, self.max_rounds)),
        })
    }

    /// `repetitions` members with seeds `base + i`, in seed order.
    fn ensemble(
        &self,
        adj: &Adjacency,
        modularity: &Modularity,
        base: u64,
    ) -> Result<Vec<Vec<usize>>> {
        let seeds: Vec<u64> = (0..self.repetitions as u64)
            .map(|i| base.wrapping_add(i))
            .collect();

        #[cfg(feature = "parallel")]
        let members: Result<Vec<Vec<usize>>> = seeds
            .par_iter()
            .map(|&seed| self.member(adj, modularity, seed))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let members: Result<Vec<Vec<usize>>> = seeds
            .iter()
            .map(|&seed| self.member(adj, modularity, seed))
            .collect();

        members
    }

    fn member(&self, adj: &Adjacency, modularity: &Modularity, seed: u64) -> Result<Vec<usize>> {
        let louvain = Louvain::new()
            .with_modularity(modularity.clone())
            .with_seed(seed);
        let coarse = louvain.detect(adj)?;
        let detection = match self.method {
            EnsembleMethod::Louvain => coarse,
            EnsembleMethod::LouvainFineTuned => FineTuner::new()
                .with_modularity(modularity.clone())
                .with_seed(seed)
                .tune(adj, Some(&coarse.partition))?,
            EnsembleMethod::ProbabilisticTuned { p } => ProbabilisticTuner::new(p)
                .with_modularity(modularity.clone())
                .with_seed(seed)
                .tune(adj, Some(&coarse.partition))?,
        };
        Ok(detection.partition)
    }
}

/// Agreement fractions and whether every member groups nodes identically.
fn agreement_of(ensemble: &[Vec<usize>]) -> Result<(Array2<f64>, bool)> {
    let counts = agreement_counts(ensemble)?;
    let reps = ensemble_size(ensemble.len())?;
    let unanimous = counts.iter().all(|&c| c == 0 || c == reps);
    let agreement = counts.mapv(|c| f64::from(c) / f64::from(reps));
    Ok((agreement, unanimous))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn two_triangles() -> Adjacency {
        let mut w = Array2::zeros((6, 6));
        for &(i, j) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
            w[(i, j)] = 1.0;
            w[(j, i)] = 1.0;
        }
        Adjacency::new(w).unwrap()
    }

    #[test]
    fn consensus_on_clear_structure() {
        let result = Consensus::new(0.5, 10).with_seed(17).run(&two_triangles()).unwrap();
        assert_eq!(result.partition, vec![0, 0, 0, 1, 1, 1]);
        assert!(result.converged());
        assert_eq!(result.agreement[(0, 1)], 1.0);
        assert_eq!(result.agreement[(0, 4)], 0.0);
        assert_eq!(result.agreement[(2, 2)], 0.0);
    }

    #[test]
    fn single_member_ensemble_is_a_fixed_point() {
        let p = vec![3, 3, 1, 1, 1, 7, 3];
        let result = Consensus::new(0.4, 5).with_seed(0).from_ensemble(&[p.clone()]).unwrap();
        assert_eq!(result.partition, canonicalize(&p));
        assert_eq!(result.rounds, 1);
    }

    #[test]
    fn output_fed_back_is_reproduced() {
        let first = Consensus::new(0.3, 8).with_seed(5).run(&two_triangles()).unwrap();
        let again = Consensus::new(0.3, 8)
            .with_seed(99)
            .from_ensemble(&[first.partition.clone()])
            .unwrap();
        assert_eq!(again.partition, first.partition);
    }

    #[test]
    fn disagreeing_ensemble_is_resolved() {
        // Two views of a 6-node graph that disagree about nodes 2 and 3.
        let ensemble = vec![
            vec![0, 0, 0, 1, 1, 1],
            vec![0, 0, 0, 1, 1, 1],
            vec![0, 0, 1, 1, 1, 1],
        ];
        let result = Consensus::new(0.5, 6).with_seed(2).from_ensemble(&ensemble).unwrap();
        assert_eq!(result.partition, vec![0, 0, 0, 1, 1, 1]);
        assert!(result.rounds >= 2);
    }

    #[test]
    fn same_seed_same_consensus() {
        let adj = two_triangles();
        let a = Consensus::new(0.5, 6)
            .with_seed(123)
            .with_method(EnsembleMethod::ProbabilisticTuned { p: 0.1 })
            .run(&adj)
            .unwrap();
        let b = Consensus::new(0.5, 6)
            .with_seed(123)
            .with_method(EnsembleMethod::ProbabilisticTuned { p: 0.1 })
            .run(&adj)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fine_tuned_members() {
        let result = Consensus::new(0.5, 4)
            .with_seed(1)
            .with_method(EnsembleMethod::LouvainFineTuned)
            .run(&two_triangles())
            .unwrap();
        assert_eq!(result.partition, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn rejects_bad_configuration() {
        let adj = two_triangles();
        assert!(Consensus::new(1.5, 4).run(&adj).is_err());
        assert!(Consensus::new(-0.1, 4).run(&adj).is_err());
        assert!(Consensus::new(0.5, 0).run(&adj).is_err());
        assert!(Consensus::new(0.5, 4).with_max_rounds(0).run(&adj).is_err());
        assert!(Consensus::new(0.5, 4)
            .with_method(EnsembleMethod::ProbabilisticTuned { p: 2.0 })
            .run(&adj)
            .is_err());
        assert_eq!(
            Consensus::new(0.5, 4).from_ensemble(&[]).unwrap_err(),
            Error::EmptyInput
        );
    }

    #[test]
    fn round_cap_returns_last_partition() {
        let ensemble = vec![vec![0, 0, 1, 1], vec![0, 1, 0, 1]];
        let result = Consensus::new(0.0, 2)
            .with_seed(4)
            .with_max_rounds(1)
            .from_ensemble(&ensemble)
            .unwrap();
        assert_eq!(result.warning.map(|w| w.stage), Some(Stage::Rounds));
        assert_eq!(result.partition.len(), 4);
    }
}
