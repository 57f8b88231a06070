//! Local-search refinement of an existing partition.
//!
//! [`FineTuner`] is a deterministic hill climb: in random node order, each
//! node moves to the occupied community (or fresh singleton) with the largest
//! strictly positive Q gain, until a full pass moves nothing. Q never
//! decreases.
//!
//! [`ProbabilisticTuner`] enumerates the same moves but, when a node has no
//! improving move, relocates it anyway with probability `p`. The acceptance
//! rule depends only on whether a move improves Q, not on how much it loses.
//! With `p = 0` it makes exactly the draws [`FineTuner`] makes and returns
//! the same partition. For `p > 0` passes rarely go quiet, so the pass cap is
//! the usual exit; the partition returned is then the best one seen at a
//! pass boundary, never worse than the starting partition.

use super::modularity::{quality, Modularity};
use super::moves::{tune, MoveState};
use super::traits::CommunityDetection;
use super::Detection;
use crate::adjacency::{Adjacency, GraphKind};
use crate::error::{check_positive, check_unit_interval, Result};
use crate::random::RandomStream;

/// Deterministic local refinement.
#[derive(Debug, Clone)]
pub struct FineTuner {
    modularity: Modularity,
    max_passes: usize,
    seed: Option<u64>,
}

impl FineTuner {
    /// Create a fine-tuner with default settings.
    pub fn new() -> Self {
        Self {
            modularity: Modularity::new(),
            max_passes: 1000,
            seed: None,
        }
    }

    /// Set resolution parameter.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.modularity = self.modularity.with_resolution(resolution);
        self
    }

    /// Set the graph kind (directed / signed).
    pub fn with_kind(mut self, kind: GraphKind) -> Self {
        self.modularity = self.modularity.with_kind(kind);
        self
    }

    /// Replace the whole quality function.
    pub fn with_modularity(mut self, modularity: Modularity) -> Self {
        self.modularity = modularity;
        self
    }

    /// Set maximum passes over all nodes.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Refine `initial`, or singletons when `None`.
    pub fn tune(&self, adj: &Adjacency, initial: Option<&[usize]>) -> Result<Detection> {
        let mut rng = RandomStream::new(self.seed);
        self.tune_with(adj, initial, &mut rng)
    }

    /// Refine with an explicit stream instead of the configured seed.
    pub fn tune_with(
        &self,
        adj: &Adjacency,
        initial: Option<&[usize]>,
        rng: &mut RandomStream,
    ) -> Result<Detection> {
        run(&self.modularity, adj, initial, 0.0, self.max_passes, rng)
    }
}

impl Default for FineTuner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for FineTuner {
    fn detect(&self, adj: &Adjacency) -> Result<Detection> {
        self.tune(adj, None)
    }

    fn resolution(&self) -> f64 {
        self.modularity.resolution()
    }
}

/// Stochastic local refinement.
#[derive(Debug, Clone)]
pub struct ProbabilisticTuner {
    modularity: Modularity,
    /// Probability of accepting a non-improving move.
    p: f64,
    max_passes: usize,
    seed: Option<u64>,
}

impl ProbabilisticTuner {
    /// Create a tuner accepting non-improving moves with probability `p`.
    pub fn new(p: f64) -> Self {
        Self {
            modularity: Modularity::new(),
            p,
            max_passes: 1000,
            seed: None,
        }
    }

    /// Set resolution parameter.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.modularity = self.modularity.with_resolution(resolution);
        self
    }

    /// Set the graph kind (directed / signed).
    pub fn with_kind(mut self, kind: GraphKind) -> Self {
        self.modularity = self.modularity.with_kind(kind);
        self
    }

    /// Replace the whole quality function.
    pub fn with_modularity(mut self, modularity: Modularity) -> Self {
        self.modularity = modularity;
        self
    }

    /// Set maximum passes over all nodes.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Acceptance probability for non-improving moves.
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Refine `initial`, or singletons when `None`.
    pub fn tune(&self, adj: &Adjacency, initial: Option<&[usize]>) -> Result<Detection> {
        let mut rng = RandomStream::new(self.seed);
        self.tune_with(adj, initial, &mut rng)
    }

    /// Refine with an explicit stream instead of the configured seed.
    pub fn tune_with(
        &self,
        adj: &Adjacency,
        initial: Option<&[usize]>,
        rng: &mut RandomStream,
    ) -> Result<Detection> {
        check_unit_interval("p", self.p)?;
        run(&self.modularity, adj, initial, self.p, self.max_passes, rng)
    }
}

impl CommunityDetection for ProbabilisticTuner {
    fn detect(&self, adj: &Adjacency) -> Result<Detection> {
        self.tune(adj, None)
    }

    fn resolution(&self) -> f64 {
        self.modularity.resolution()
    }
}

fn run(
    modularity: &Modularity,
    adj: &Adjacency,
    initial: Option<&[usize]>,
    p: f64,
    max_passes: usize,
    rng: &mut RandomStream,
) -> Result<Detection> {
    check_positive("max_passes", max_passes)?;
    if let Some(labels) = initial {
        adj.check_partition(labels)?;
    }
    let b = modularity.search_matrix(adj)?;

    let mut state = match initial {
        Some(labels) => MoveState::from_labels(b.view(), labels),
        None => MoveState::singletons(b.view()),
    };
    let start = state.quality();
    let warning = tune(&mut state, p, max_passes, rng);

    let partition = state.labels();
    let q = quality(b.view(), &partition);
    tracing::debug!(start, q, p, "tuning finished");
    Ok(Detection {
        partition,
        quality: q,
        warning,
    })
}
