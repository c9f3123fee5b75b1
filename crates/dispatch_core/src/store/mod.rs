//! Entity store: the authoritative drivers, riders and requests.
//!
//! Entities live in a bevy [`World`]; [`EntityIndex`] maps the public ids to
//! ECS entities and doubles as the ascending-id iteration order used by the
//! dispatch and tick systems. The store performs no locking of its own: every
//! caller reaches it through a [`crate::guard::StoreGuard`].

mod assignment;
mod crud;

use std::collections::BTreeMap;

use bevy_ecs::prelude::{Entity, Resource, Schedule, World};
use bevy_ecs::schedule::ExecutorKind;
use tracing::info;

use crate::clock::SimulationClock;
use crate::config::DispatchConfig;
use crate::ecs::{DriverId, RequestId, RiderId};
use crate::error::Result;
use crate::grid::GridBounds;
use crate::matching::{
    CostBasedMatching, DispatchOutcome, MatchingAlgorithmResource, RandomRejection,
    RejectionPolicy, RejectionPolicyResource,
};
use crate::systems::dispatch::{dispatch_system, DispatchReport};
use crate::systems::tick::{tick_system, MovementSettings, TickReport, TickSummary};

/// Public id to ECS entity, per collection, ordered by id.
#[derive(Debug, Default, Resource)]
pub struct EntityIndex {
    pub drivers: BTreeMap<DriverId, Entity>,
    pub riders: BTreeMap<RiderId, Entity>,
    pub requests: BTreeMap<RequestId, Entity>,
}

/// Next id per collection. Ids start at 1 and only `reset_all` rewinds them.
#[derive(Debug, Resource)]
pub struct IdAllocator {
    next_driver: u64,
    next_rider: u64,
    next_request: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next_driver: 1,
            next_rider: 1,
            next_request: 1,
        }
    }
}

impl IdAllocator {
    pub fn next_driver(&mut self) -> DriverId {
        let id = DriverId(self.next_driver);
        self.next_driver += 1;
        id
    }

    pub fn next_rider(&mut self) -> RiderId {
        let id = RiderId(self.next_rider);
        self.next_rider += 1;
        id
    }

    pub fn next_request(&mut self) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        id
    }
}

fn single_system_schedule<M>(system: impl bevy_ecs::schedule::IntoSystemConfigs<M>) -> Schedule {
    let mut schedule = Schedule::default();
    // Passes are sequential by contract; no worker threads.
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(system);
    schedule
}

pub struct EntityStore {
    world: World,
    bounds: GridBounds,
    /// Rate and seed of the built-in random policy, replayed on reset.
    random_rejection: Option<(f64, Option<u64>)>,
    dispatch_schedule: Schedule,
    tick_schedule: Schedule,
}

impl EntityStore {
    /// Builds an empty store using a [`RandomRejection`] policy drawn from the config.
    pub fn new(config: &DispatchConfig) -> Result<Self> {
        let policy = RandomRejection::new(config.rejection_rate, config.rejection_seed);
        let mut store = Self::with_rejection_policy(config, Box::new(policy))?;
        store.random_rejection = Some((config.rejection_rate, config.rejection_seed));
        Ok(store)
    }

    /// Builds an empty store with a caller-supplied rejection policy.
    pub fn with_rejection_policy(
        config: &DispatchConfig,
        policy: Box<dyn RejectionPolicy>,
    ) -> Result<Self> {
        config.validate()?;

        let mut world = World::new();
        world.insert_resource(EntityIndex::default());
        world.insert_resource(IdAllocator::default());
        world.insert_resource(SimulationClock::default());
        world.insert_resource(DispatchReport::default());
        world.insert_resource(TickReport::default());
        world.insert_resource(MovementSettings {
            move_speed: config.move_speed,
        });
        world.insert_resource(MatchingAlgorithmResource::new(Box::new(
            CostBasedMatching::new(config.distance_weight, config.load_weight),
        )));
        world.insert_resource(RejectionPolicyResource::new(policy));

        Ok(Self {
            world,
            bounds: config.grid,
            random_rejection: None,
            dispatch_schedule: single_system_schedule(dispatch_system),
            tick_schedule: single_system_schedule(tick_system),
        })
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    pub(crate) fn index(&self) -> &EntityIndex {
        self.world.resource::<EntityIndex>()
    }

    /// Runs one dispatch pass over every waiting request.
    pub fn dispatch(&mut self) -> Vec<DispatchOutcome> {
        self.dispatch_schedule.run(&mut self.world);
        let outcomes = std::mem::take(&mut self.world.resource_mut::<DispatchReport>().0);
        info!(
            processed = outcomes.len(),
            assigned = outcomes
                .iter()
                .filter(|outcome| matches!(outcome, DispatchOutcome::Assigned { .. }))
                .count(),
            "dispatch pass finished"
        );
        outcomes
    }

    /// Advances simulated time by one unit.
    pub fn tick(&mut self) -> TickSummary {
        self.tick_schedule.run(&mut self.world);
        let summary = std::mem::take(&mut self.world.resource_mut::<TickReport>().0);
        info!(time = summary.time, events = summary.events.len(), "tick finished");
        summary
    }

    /// Drops every entity and rewinds ids and time to their initial values.
    ///
    /// The built-in random policy restarts from its seed, so a seeded run
    /// replays the same rejections after a reset. An injected policy keeps
    /// its state.
    pub fn reset_all(&mut self) {
        if let Some((rate, seed)) = self.random_rejection {
            self.world
                .insert_resource(RejectionPolicyResource::new(Box::new(RandomRejection::new(
                    rate, seed,
                ))));
        }
        self.world.clear_entities();
        self.world.insert_resource(EntityIndex::default());
        self.world.insert_resource(IdAllocator::default());
        self.world.insert_resource(SimulationClock::default());
        self.world.insert_resource(DispatchReport::default());
        self.world.insert_resource(TickReport::default());
        info!("store reset");
    }
}
