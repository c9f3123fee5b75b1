use crate::grid::{distance, GridPoint};

use super::algorithm::MatchingAlgorithm;
use super::types::MatchCandidate;

/// Weighted cost: `distance_weight * ETA + load_weight * load`.
///
/// ETA is the Manhattan distance from the driver to the pickup point.
#[derive(Debug, Clone, Copy)]
pub struct CostBasedMatching {
    /// Weight for pickup distance (alpha).
    pub distance_weight: f64,
    /// Weight for the driver's current load (beta).
    pub load_weight: f64,
}

impl CostBasedMatching {
    pub fn new(distance_weight: f64, load_weight: f64) -> Self {
        Self {
            distance_weight,
            load_weight,
        }
    }
}

impl MatchingAlgorithm for CostBasedMatching {
    fn score(&self, pickup: GridPoint, candidate: &MatchCandidate) -> f64 {
        let eta = distance(candidate.position, pickup) as f64;
        self.distance_weight * eta + self.load_weight * f64::from(candidate.load)
    }
}
