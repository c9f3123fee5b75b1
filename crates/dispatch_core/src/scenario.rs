//! Scenario seeding: a serializable description of an initial store state.
//!
//! A scenario is validated as a whole before the store is touched; loading
//! then resets the store and creates every entity in list order, so ids
//! follow the order of the lists.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ecs::{DriverSnapshot, DriverStatus, RequestSnapshot, RiderSnapshot};
use crate::error::{DispatchError, Result};
use crate::grid::{GridBounds, GridPoint};
use crate::store::EntityStore;

fn default_driver_status() -> DriverStatus {
    DriverStatus::Available
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSeed {
    pub position: GridPoint,
    #[serde(default = "default_driver_status")]
    pub status: DriverStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderSeed {
    pub pickup: GridPoint,
    pub dropoff: GridPoint,
}

/// A request for the rider at position `rider` in [`ScenarioSpec::riders`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSeed {
    pub rider: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSpec {
    pub drivers: Vec<DriverSeed>,
    pub riders: Vec<RiderSeed>,
    pub requests: Vec<RequestSeed>,
}

/// Entities created by a scenario load, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub drivers: Vec<DriverSnapshot>,
    pub riders: Vec<RiderSnapshot>,
    pub requests: Vec<RequestSnapshot>,
}

impl ScenarioSpec {
    /// Three drivers (one offline) and two riders, each with an open request.
    pub fn sample() -> Self {
        let driver = |x, y, status| DriverSeed {
            position: GridPoint::new(x, y),
            status,
        };
        let rider = |pickup: (i64, i64), dropoff: (i64, i64)| RiderSeed {
            pickup: pickup.into(),
            dropoff: dropoff.into(),
        };
        Self {
            drivers: vec![
                driver(0, 0, DriverStatus::Available),
                driver(5, 5, DriverStatus::Available),
                driver(10, 10, DriverStatus::Offline),
            ],
            riders: vec![rider((2, 2), (8, 8)), rider((15, 15), (20, 20))],
            requests: vec![RequestSeed { rider: 0 }, RequestSeed { rider: 1 }],
        }
    }

    /// Checks every seed against the grid and the driver and rider rules.
    pub fn validate(&self, bounds: GridBounds) -> Result<()> {
        let check = |label: String, point: GridPoint| {
            if bounds.contains(point) {
                Ok(())
            } else {
                Err(DispatchError::invalid_input(format!(
                    "{label} {point} is outside the {}x{} grid",
                    bounds.width, bounds.height
                )))
            }
        };

        for (i, driver) in self.drivers.iter().enumerate() {
            check(format!("drivers[{i}].position"), driver.position)?;
            if driver.status == DriverStatus::OnTrip {
                return Err(DispatchError::invalid_input(format!(
                    "drivers[{i}] cannot start on a trip"
                )));
            }
        }
        for (i, rider) in self.riders.iter().enumerate() {
            check(format!("riders[{i}].pickup"), rider.pickup)?;
            check(format!("riders[{i}].dropoff"), rider.dropoff)?;
        }
        for (i, request) in self.requests.iter().enumerate() {
            if request.rider >= self.riders.len() {
                return Err(DispatchError::invalid_input(format!(
                    "requests[{i}] references rider {} but only {} riders are listed",
                    request.rider,
                    self.riders.len()
                )));
            }
        }
        Ok(())
    }
}

impl EntityStore {
    /// Replaces the whole store contents with `spec`.
    ///
    /// On a validation error the store is left untouched.
    pub fn load_scenario(&mut self, spec: &ScenarioSpec) -> Result<ScenarioSummary> {
        spec.validate(self.bounds())?;
        self.reset_all();

        let mut summary = ScenarioSummary::default();
        for seed in &spec.drivers {
            summary
                .drivers
                .push(self.create_driver(seed.position, seed.status)?);
        }
        for seed in &spec.riders {
            summary
                .riders
                .push(self.create_rider(seed.pickup, seed.dropoff)?);
        }
        for seed in &spec.requests {
            let rider_id = summary.riders[seed.rider].id;
            summary.requests.push(self.create_request(rider_id)?);
        }

        info!(
            drivers = summary.drivers.len(),
            riders = summary.riders.len(),
            requests = summary.requests.len(),
            "scenario loaded"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;
    use crate::ecs::{DriverId, RequestStatus, RiderId};

    #[test]
    fn sample_loads_with_sequential_ids() {
        let mut store = EntityStore::new(&DispatchConfig::default()).expect("store");
        let summary = store.load_scenario(&ScenarioSpec::sample()).expect("load");

        assert_eq!(summary.drivers.len(), 3);
        assert_eq!(summary.drivers[2].id, DriverId(3));
        assert_eq!(summary.drivers[2].status, DriverStatus::Offline);
        assert_eq!(summary.requests[1].rider_id, RiderId(2));
        assert_eq!(summary.requests[1].pickup, GridPoint::new(15, 15));
        assert!(summary
            .requests
            .iter()
            .all(|request| request.status == RequestStatus::Waiting));
    }

    #[test]
    fn invalid_scenario_leaves_store_untouched() {
        let mut store = EntityStore::new(&DispatchConfig::default()).expect("store");
        store.load_scenario(&ScenarioSpec::sample()).expect("load");

        let mut broken = ScenarioSpec::sample();
        broken.requests.push(RequestSeed { rider: 7 });
        let err = store.load_scenario(&broken).expect_err("bad rider index");
        assert!(matches!(err, DispatchError::InvalidInput { .. }));
        assert_eq!(store.drivers().len(), 3);
        assert_eq!(store.requests().len(), 2);
    }

    #[test]
    fn reloading_restarts_ids() {
        let mut store = EntityStore::new(&DispatchConfig::default()).expect("store");
        store.load_scenario(&ScenarioSpec::sample()).expect("first load");
        let summary = store.load_scenario(&ScenarioSpec::sample()).expect("second load");
        assert_eq!(summary.drivers[0].id, DriverId(1));
    }

    #[test]
    fn reloading_replays_seeded_rejections() {
        let spec = ScenarioSpec {
            drivers: (0..10)
                .map(|i| DriverSeed {
                    position: GridPoint::new(i * 3, 0),
                    status: DriverStatus::Available,
                })
                .collect(),
            riders: (0..10)
                .map(|i| RiderSeed {
                    pickup: GridPoint::new(i * 2, 5),
                    dropoff: GridPoint::new(0, 9),
                })
                .collect(),
            requests: (0..10).map(|rider| RequestSeed { rider }).collect(),
        };
        let config = DispatchConfig::default()
            .with_rejection_rate(0.5)
            .with_rejection_seed(11);

        let mut fresh = EntityStore::new(&config).expect("store");
        fresh.load_scenario(&spec).expect("load");
        let expected = fresh.dispatch();

        let mut reused = EntityStore::new(&config).expect("store");
        reused.load_scenario(&spec).expect("first load");
        reused.dispatch();
        reused.load_scenario(&spec).expect("second load");

        assert_eq!(reused.dispatch(), expected);
    }

    #[test]
    fn parses_json_with_default_status() {
        let spec: ScenarioSpec = serde_json::from_str(
            r#"{
                "drivers": [{"position": {"x": 1, "y": 2}}],
                "riders": [{"pickup": {"x": 0, "y": 0}, "dropoff": {"x": 3, "y": 3}}],
                "requests": [{"rider": 0}]
            }"#,
        )
        .expect("scenario json");
        assert_eq!(spec.drivers[0].status, DriverStatus::Available);
        assert!(spec.validate(GridBounds::default()).is_ok());
    }
}
