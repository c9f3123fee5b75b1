use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ecs::{DriverId, RequestId};

/// Decides whether a driver turns down an offered assignment.
pub trait RejectionPolicy: Send + Sync {
    fn should_reject(&mut self, request: RequestId, driver: DriverId) -> bool;
}

/// Rejects each attempt independently with probability `rate`.
#[derive(Debug)]
pub struct RandomRejection {
    rate: f64,
    rng: StdRng,
}

impl RandomRejection {
    pub fn new(rate: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rate, rng }
    }
}

impl RejectionPolicy for RandomRejection {
    fn should_reject(&mut self, _request: RequestId, _driver: DriverId) -> bool {
        self.rng.gen::<f64>() < self.rate
    }
}

/// Resource wrapper for the rejection policy trait object.
#[derive(Resource)]
pub struct RejectionPolicyResource(pub Box<dyn RejectionPolicy>);

impl RejectionPolicyResource {
    pub fn new(policy: Box<dyn RejectionPolicy>) -> Self {
        Self(policy)
    }
}
