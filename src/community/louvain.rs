//! Louvain algorithm for community detection.
//!
//! Fast modularity optimization through local node moves and graph aggregation.
//!
//! ## The Algorithm (Blondel et al. 2008)
//!
//! Louvain is a multi-level, greedy modularity optimization algorithm:
//!
//! 1. **Phase 1 (Local Moving)**: Start with each node in its own community.
//!    Visit nodes in random order and move each to the neighboring community
//!    with the highest strictly positive modularity gain, until a full pass
//!    moves nothing.
//!
//! 2. **Phase 2 (Aggregation)**: Build a meta-graph where communities become
//!    single nodes. Edge weights are sums of edges between communities.
//!    Self-loops represent internal community edges.
//!
//! 3. **Iterate**: Repeat phases 1-2 on the meta-graph until a level no
//!    longer collapses.
//!
//! ## Levels
//!
//! Each aggregation level owns its reduced adjacency matrix, its reduced
//! modularity matrix, and a back-mapping from super-node to the nodes of the
//! level below. Levels sit in a `Vec` arena, so expanding the top level's
//! labels to the original nodes is a chain of index lookups.
//!
//! Summing B over blocks gives exactly the modularity matrix of the summed
//! adjacency (strengths add up), so the null model never needs rebuilding.
//!
//! ## References
//!
//! Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! Journal of Statistical Mechanics: Theory and Experiment, P10008.

use super::modularity::{quality, Modularity};
use super::moves::MoveState;
use super::traits::CommunityDetection;
use super::Detection;
use crate::adjacency::{Adjacency, GraphKind};
use crate::error::{check_positive, ConvergenceWarning, Result, Stage};
use crate::partition::{canonicalize, community_count};
use crate::random::RandomStream;
use ndarray::Array2;

/// Louvain community detection algorithm.
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Quality function (resolution, graph kind).
    modularity: Modularity,
    /// Maximum local-moving passes per level.
    max_passes: usize,
    /// Maximum levels of aggregation.
    max_levels: usize,
    /// Random seed for visit order and tie-breaking.
    seed: Option<u64>,
}

impl Louvain {
    /// Create a new Louvain detector with default settings.
    pub fn new() -> Self {
        Self {
            modularity: Modularity::new(),
            max_passes: 1000,
            max_levels: 100,
            seed: None,
        }
    }

    /// Set resolution parameter.
    ///
    /// Higher values produce smaller communities.
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

    /// Set maximum local-moving passes per level.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set maximum aggregation levels.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run with an explicit stream instead of the configured seed.
    pub fn detect_with(&self, adj: &Adjacency, rng: &mut RandomStream) -> Result<Detection> {
        check_positive("max_passes", self.max_passes)?;
        check_positive("max_levels", self.max_levels)?;
        let b = self.modularity.search_matrix(adj)?;

        let mut levels: Vec<Level> = Vec::new();
        let mut top = Level::base(adj.weights().to_owned(), b.clone());
        let mut warning = None;
        let mut converged = false;

        for depth in 0..self.max_levels {
            // Phase 1: Local moving
            let (labels, pass_warning) = self.local_moving(&top, rng);
            warning = warning.or(pass_warning);

            let k = community_count(&labels);
            tracing::debug!(depth, nodes = top.n(), communities = k, "louvain level");

            // No aggregation would happen: each node is its own community
            if k == top.n() {
                converged = true;
                break;
            }

            // Phase 2: Aggregate
            let next = top.aggregate(&labels, k);
            levels.push(std::mem::replace(&mut top, next));
        }

        if !converged {
            warning = Some(ConvergenceWarning::new(Stage::Levels, self.max_levels));
        }
        levels.push(top);

        let partition = expand_partition(&levels);
        let q = quality(b.view(), &partition);
        Ok(Detection {
            partition,
            quality: q,
            warning,
        })
    }

    /// Phase 1: Local moving from singletons on one level.
    fn local_moving(
        &self,
        level: &Level,
        rng: &mut RandomStream,
    ) -> (Vec<usize>, Option<ConvergenceWarning>) {
        let n = level.n();
        let neighbors = level.neighbors();
        let mut state = MoveState::singletons(level.modularity.view());

        for _pass in 0..self.max_passes {
            let mut improved = false;

            for node in rng.permutation(n) {
                let current = state.community(node);
                let mut candidates: Vec<usize> = neighbors[node]
                    .iter()
                    .map(|&j| state.community(j))
                    .filter(|&c| c != current)
                    .collect();
                candidates.sort_unstable();
                candidates.dedup();

                // Staying has gain 0; only strictly positive gains move.
                if let Some(best) = state.best_move(node, &candidates, rng) {
                    state.apply(node, best);
                    improved = true;
                }
            }

            if !improved {
                return (state.labels(), None);
            }
        }

        (
            state.labels(),
            Some(ConvergenceWarning::new(Stage::Passes, self.max_passes)),
        )
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for Louvain {
    fn detect(&self, adj: &Adjacency) -> Result<Detection> {
        let mut rng = RandomStream::new(self.seed);
        self.detect_with(adj, &mut rng)
    }

    fn resolution(&self) -> f64 {
        self.modularity.resolution()
    }
}

/// One aggregation level.
#[derive(Debug, Clone)]
struct Level {
    /// Reduced adjacency: summed weights between super-nodes.
    weights: Array2<f64>,
    /// Reduced symmetric modularity matrix.
    modularity: Array2<f64>,
    /// Super-node -> member nodes of the level below. Empty for the base level.
    members: Vec<Vec<usize>>,
}

impl Level {
    fn base(weights: Array2<f64>, modularity: Array2<f64>) -> Self {
        Self {
            weights,
            modularity,
            members: Vec::new(),
        }
    }

    fn n(&self) -> usize {
        self.weights.nrows()
    }

    /// Nodes sharing a non-zero weight in either direction, excluding self.
    fn neighbors(&self) -> Vec<Vec<usize>> {
        let n = self.n();
        (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| j != i && (self.weights[(i, j)] != 0.0 || self.weights[(j, i)] != 0.0))
                    .collect()
            })
            .collect()
    }

    /// Phase 2: collapse communities (canonical `labels`, `k` of them) into super-nodes.
    fn aggregate(&self, labels: &[usize], k: usize) -> Level {
        let n = self.n();
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
        for (node, &c) in labels.iter().enumerate() {
            members[c].push(node);
        }

        let mut weights = Array2::<f64>::zeros((k, k));
        let mut modularity = Array2::<f64>::zeros((k, k));
        for i in 0..n {
            for j in 0..n {
                let (ci, cj) = (labels[i], labels[j]);
                weights[(ci, cj)] += self.weights[(i, j)];
                modularity[(ci, cj)] += self.modularity[(i, j)];
            }
        }

        Level {
            weights,
            modularity,
            members,
        }
    }
}

/// Expand the top level's super-nodes (one community each) to the base nodes.
fn expand_partition(levels: &[Level]) -> Vec<usize> {
    let Some(top) = levels.last() else {
        return Vec::new();
    };
    let mut labels: Vec<usize> = (0..top.n()).collect();

    // Walk down: level L maps its super-nodes onto level L - 1.
    for pair in levels.windows(2).rev() {
        let (below, above) = (&pair[0], &pair[1]);
        let mut expanded = vec![0; below.n()];
        for (super_node, nodes) in above.members.iter().enumerate() {
            for &node in nodes {
                expanded[node] = labels[super_node];
            }
        }
        labels = expanded;
    }

    canonicalize(&labels)
}
