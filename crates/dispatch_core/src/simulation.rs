//! Public facade over the entity store.
//!
//! Each method runs as one guarded operation: state checks and mutations
//! happen under a single acquisition of the [`StoreGuard`], so concurrent
//! callers see either none or all of an operation's effects.

use crate::config::DispatchConfig;
use crate::ecs::{
    DriverId, DriverSnapshot, DriverStatus, RequestId, RequestSnapshot, RiderId, RiderSnapshot,
};
use crate::error::{DispatchError, Result};
use crate::grid::GridPoint;
use crate::guard::{LockedStore, StoreGuard, UnlockedStore};
use crate::matching::{DispatchOutcome, RejectionPolicy};
use crate::scenario::{ScenarioSpec, ScenarioSummary};
use crate::store::EntityStore;
use crate::systems::tick::TickSummary;
use crate::telemetry::StatusCounts;

pub struct Simulation<G: StoreGuard = LockedStore> {
    guard: G,
    config: DispatchConfig,
}

/// Lock-free variant for single-threaded benchmarking. The type is `!Sync`.
pub type UnlockedSimulation = Simulation<UnlockedStore>;

impl Simulation<LockedStore> {
    pub fn new(config: DispatchConfig) -> Result<Self> {
        Self::with_guard(config)
    }
}

impl<G: StoreGuard> Simulation<G> {
    /// Builds an empty simulation behind guard `G`, rejecting at the configured rate.
    ///
    /// `config.concurrency_guard` must name the same guard as `G`.
    pub fn with_guard(config: DispatchConfig) -> Result<Self> {
        check_guard::<G>(&config)?;
        let store = EntityStore::new(&config)?;
        Ok(Self::from_parts(store, config))
    }

    /// Builds an empty simulation with an injected rejection policy.
    pub fn with_rejection_policy(
        config: DispatchConfig,
        policy: Box<dyn RejectionPolicy>,
    ) -> Result<Self> {
        check_guard::<G>(&config)?;
        let store = EntityStore::with_rejection_policy(&config, policy)?;
        Ok(Self::from_parts(store, config))
    }

    fn from_parts(store: EntityStore, config: DispatchConfig) -> Self {
        Self {
            guard: G::from_store(store),
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Runs `op` as one guarded operation. Escape hatch for callers composing
    /// several store calls that must not interleave with other operations.
    pub fn with_store<R>(&self, op: impl FnOnce(&mut EntityStore) -> R) -> R {
        self.guard.with_store(op)
    }

    pub fn create_driver(
        &self,
        position: GridPoint,
        status: DriverStatus,
    ) -> Result<DriverSnapshot> {
        self.with_store(|store| store.create_driver(position, status))
    }

    pub fn create_rider(&self, pickup: GridPoint, dropoff: GridPoint) -> Result<RiderSnapshot> {
        self.with_store(|store| store.create_rider(pickup, dropoff))
    }

    pub fn create_request(&self, rider_id: RiderId) -> Result<RequestSnapshot> {
        self.with_store(|store| store.create_request(rider_id))
    }

    pub fn driver(&self, id: DriverId) -> Result<DriverSnapshot> {
        self.with_store(|store| store.driver(id))
    }

    pub fn rider(&self, id: RiderId) -> Result<RiderSnapshot> {
        self.with_store(|store| store.rider(id))
    }

    pub fn request(&self, id: RequestId) -> Result<RequestSnapshot> {
        self.with_store(|store| store.request(id))
    }

    pub fn drivers(&self) -> Vec<DriverSnapshot> {
        self.with_store(|store| store.drivers())
    }

    pub fn riders(&self) -> Vec<RiderSnapshot> {
        self.with_store(|store| store.riders())
    }

    pub fn requests(&self) -> Vec<RequestSnapshot> {
        self.with_store(|store| store.requests())
    }

    pub fn update_driver_status(
        &self,
        id: DriverId,
        status: DriverStatus,
    ) -> Result<DriverSnapshot> {
        self.with_store(|store| store.update_driver_status(id, status))
    }

    pub fn update_rider(
        &self,
        id: RiderId,
        pickup: GridPoint,
        dropoff: GridPoint,
    ) -> Result<RiderSnapshot> {
        self.with_store(|store| store.update_rider(id, pickup, dropoff))
    }

    pub fn delete_driver(&self, id: DriverId) -> Result<DriverSnapshot> {
        self.with_store(|store| store.delete_driver(id))
    }

    pub fn delete_rider(&self, id: RiderId) -> Result<RiderSnapshot> {
        self.with_store(|store| store.delete_rider(id))
    }

    pub fn dispatch(&self) -> Vec<DispatchOutcome> {
        self.with_store(|store| store.dispatch())
    }

    pub fn tick(&self) -> TickSummary {
        self.with_store(|store| store.tick())
    }

    pub fn accept(&self, request_id: RequestId, driver_id: DriverId) -> Result<RequestSnapshot> {
        self.with_store(|store| store.accept(request_id, driver_id))
    }

    pub fn reject(&self, request_id: RequestId, driver_id: DriverId) -> Result<RequestSnapshot> {
        self.with_store(|store| store.reject(request_id, driver_id))
    }

    pub fn status(&self) -> StatusCounts {
        self.with_store(|store| store.status())
    }

    pub fn now(&self) -> u64 {
        self.with_store(|store| store.now())
    }

    pub fn reset_all(&self) {
        self.with_store(|store| store.reset_all());
    }

    pub fn load_scenario(&self, spec: &ScenarioSpec) -> Result<ScenarioSummary> {
        self.with_store(|store| store.load_scenario(spec))
    }

    /// Resets the store and seeds [`ScenarioSpec::sample`].
    pub fn load_sample_data(&self) -> Result<ScenarioSummary> {
        self.load_scenario(&ScenarioSpec::sample())
    }
}

fn check_guard<G: StoreGuard>(config: &DispatchConfig) -> Result<()> {
    if config.concurrency_guard == G::LOCKED {
        Ok(())
    } else {
        Err(DispatchError::invalid_input(format!(
            "concurrency_guard = {} does not match the {} store",
            config.concurrency_guard,
            if G::LOCKED { "locked" } else { "unlocked" }
        )))
    }
}
