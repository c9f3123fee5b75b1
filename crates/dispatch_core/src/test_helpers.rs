//! Test helpers for deterministic dispatch setups.

use std::collections::VecDeque;

use crate::config::DispatchConfig;
use crate::ecs::{DriverId, DriverStatus, RequestId};
use crate::grid::GridPoint;
use crate::guard::StoreGuard;
use crate::matching::RejectionPolicy;
use crate::simulation::Simulation;

/// Rejection policy that replays a fixed script of decisions.
///
/// Once the script runs out every further attempt gets the fallback answer.
#[derive(Debug, Clone)]
pub struct ScriptedRejection {
    script: VecDeque<bool>,
    fallback: bool,
}

impl ScriptedRejection {
    pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: false,
        }
    }

    /// Rejects every attempt.
    pub fn always() -> Self {
        Self {
            script: VecDeque::new(),
            fallback: true,
        }
    }
}

impl RejectionPolicy for ScriptedRejection {
    fn should_reject(&mut self, _request: RequestId, _driver: DriverId) -> bool {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

/// Default config with rejection off, unit speed and a fixed seed.
pub fn deterministic_config() -> DispatchConfig {
    DispatchConfig::default()
        .with_rejection_rate(0.0)
        .with_move_speed(1.0)
        .with_rejection_seed(42)
}

/// Simulation behind guard `G` whose rejections follow `policy`.
///
/// # Panics
///
/// Panics if `config` does not validate.
pub fn scripted_simulation<G: StoreGuard>(
    config: DispatchConfig,
    policy: ScriptedRejection,
) -> Simulation<G> {
    Simulation::with_rejection_policy(config, Box::new(policy))
        .expect("test config should validate")
}

/// One available driver at (0,0) and one waiting request from (2,2) to (8,8).
///
/// # Panics
///
/// Panics if the entities cannot be created (should never happen on the default grid).
pub fn single_trip_simulation(config: DispatchConfig) -> Simulation {
    let sim = Simulation::new(config).expect("test config should validate");
    sim.create_driver(GridPoint::new(0, 0), DriverStatus::Available)
        .expect("driver inside grid");
    let rider = sim
        .create_rider(GridPoint::new(2, 2), GridPoint::new(8, 8))
        .expect("rider inside grid");
    sim.create_request(rider.id).expect("rider exists");
    sim
}
