//! Settle loop: alternates dispatch and tick until no request can progress.

use serde::Serialize;
use tracing::{info, warn};

use crate::guard::StoreGuard;
use crate::matching::DispatchOutcome;
use crate::simulation::Simulation;
use crate::systems::tick::TickEvent;
use crate::telemetry::StatusCounts;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Dispatch + tick rounds executed.
    pub steps: u64,
    /// No request was left `waiting` or `assigned`.
    pub settled: bool,
    pub outcomes: Vec<DispatchOutcome>,
    pub events: Vec<TickEvent>,
    pub status: StatusCounts,
}

/// Runs up to `max_steps` rounds of `dispatch()` followed by `tick()`.
///
/// Stops early once every request is in a terminal state. Requests that stay
/// waiting because no driver is ever available keep the loop going until
/// `max_steps`.
pub fn run_until_settled<G: StoreGuard>(sim: &Simulation<G>, max_steps: u64) -> RunSummary {
    let mut outcomes = Vec::new();
    let mut events = Vec::new();
    let mut steps = 0;

    let mut status = sim.status();
    while status.requests.open() > 0 && steps < max_steps {
        outcomes.extend(sim.dispatch());
        events.extend(sim.tick().events);
        steps += 1;
        status = sim.status();
    }

    let settled = status.requests.open() == 0;
    if settled {
        info!(steps, time = status.current_time, "simulation settled");
    } else {
        warn!(
            steps,
            waiting = status.requests.waiting,
            assigned = status.requests.assigned,
            "step limit reached before settling"
        );
    }

    RunSummary {
        steps,
        settled,
        outcomes,
        events,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;
    use crate::ecs::DriverStatus;
    use crate::grid::GridPoint;

    fn simulation() -> Simulation {
        Simulation::new(DispatchConfig::default().with_rejection_rate(0.0)).expect("simulation")
    }

    #[test]
    fn empty_store_is_already_settled() {
        let summary = run_until_settled(&simulation(), 10);
        assert!(summary.settled);
        assert_eq!(summary.steps, 0);
    }

    #[test]
    fn single_trip_settles_after_sixteen_ticks() {
        let sim = simulation();
        sim.create_driver(GridPoint::new(0, 0), DriverStatus::Available)
            .expect("driver");
        let rider = sim
            .create_rider(GridPoint::new(2, 2), GridPoint::new(8, 8))
            .expect("rider");
        sim.create_request(rider.id).expect("request");

        let summary = run_until_settled(&sim, 100);
        assert!(summary.settled);
        assert_eq!(summary.steps, 16);
        assert_eq!(summary.status.current_time, 16);
        assert_eq!(summary.status.requests.completed, 1);
        assert_eq!(summary.events.len(), 2);
    }

    #[test]
    fn unserved_requests_hit_the_step_limit() {
        let sim = simulation();
        let rider = sim
            .create_rider(GridPoint::new(2, 2), GridPoint::new(8, 8))
            .expect("rider");
        sim.create_request(rider.id).expect("request");

        let summary = run_until_settled(&sim, 5);
        assert!(!summary.settled);
        assert_eq!(summary.steps, 5);
        assert_eq!(summary.outcomes.len(), 5);
        assert_eq!(summary.status.requests.waiting, 1);
    }
}
