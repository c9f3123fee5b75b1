use crate::ecs::DriverId;
use crate::grid::GridPoint;

use super::types::MatchCandidate;

/// Scores (request, driver) pairings; lower scores win.
pub trait MatchingAlgorithm: Send + Sync {
    /// Cost of sending `candidate` to `pickup`.
    fn score(&self, pickup: GridPoint, candidate: &MatchCandidate) -> f64;

    /// Picks the lowest-scoring candidate, breaking ties by the lowest driver id.
    ///
    /// Returns `None` only when `candidates` is empty.
    fn find_match(&self, pickup: GridPoint, candidates: &[MatchCandidate]) -> Option<DriverId> {
        candidates
            .iter()
            .map(|candidate| (self.score(pickup, candidate), candidate.driver))
            .min_by(|(a_score, a_id), (b_score, b_id)| {
                a_score.total_cmp(b_score).then_with(|| a_id.cmp(b_id))
            })
            .map(|(_, driver)| driver)
    }
}
