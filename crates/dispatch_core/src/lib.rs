pub mod clock;
pub mod config;
pub mod ecs;
pub mod error;
pub mod grid;
pub mod guard;
pub mod matching;
pub mod runner;
pub mod scenario;
pub mod simulation;
pub mod store;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::DispatchConfig;
pub use error::{DispatchError, EntityKind, Result};
pub use grid::{GridBounds, GridPoint};
pub use guard::{LockedStore, StoreGuard, UnlockedStore};
pub use simulation::{Simulation, UnlockedSimulation};
