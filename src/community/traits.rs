//! Community detection traits.

use super::Detection;
use crate::adjacency::Adjacency;
use crate::error::Result;

/// Trait for community detection algorithms.
pub trait CommunityDetection {
    /// Detect communities in a graph.
    ///
    /// Returns a canonical partition (labels `0..k` in order of first
    /// appearance) together with its modularity.
    fn detect(&self, adj: &Adjacency) -> Result<Detection>;

    /// Get the resolution parameter (if applicable).
    fn resolution(&self) -> f64 {
        1.0
    }
}
