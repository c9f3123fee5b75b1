//! Driver selection: scoring behind [`MatchingAlgorithm`], driver refusals
//! behind [`RejectionPolicy`]. Both live in the world as boxed resources so a
//! store can swap either without touching the dispatch system.

pub mod algorithm;
pub mod cost_based;
pub mod rejection;
pub mod types;

use bevy_ecs::prelude::Resource;

pub use algorithm::MatchingAlgorithm;
pub use cost_based::CostBasedMatching;
pub use rejection::{RandomRejection, RejectionPolicy, RejectionPolicyResource};
pub use types::{DispatchOutcome, MatchCandidate};

/// Scorer used by every dispatch pass.
#[derive(Resource)]
pub struct MatchingAlgorithmResource(pub Box<dyn MatchingAlgorithm>);

impl MatchingAlgorithmResource {
    pub fn new(algorithm: Box<dyn MatchingAlgorithm>) -> Self {
        Self(algorithm)
    }
}

impl std::ops::Deref for MatchingAlgorithmResource {
    type Target = dyn MatchingAlgorithm;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
