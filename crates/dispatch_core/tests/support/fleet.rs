use dispatch_core::ecs::{DriverId, DriverStatus, RequestId, RiderId};
use dispatch_core::test_helpers::{deterministic_config, scripted_simulation, ScriptedRejection};
use dispatch_core::{DispatchConfig, GridPoint, Simulation};

/// Builder for small fleets with one request per rider.
#[derive(Debug, Clone)]
pub struct FleetBuilder {
    config: DispatchConfig,
    rejections: Option<ScriptedRejection>,
    drivers: Vec<(GridPoint, DriverStatus)>,
    trips: Vec<(GridPoint, GridPoint)>,
}

impl Default for FleetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FleetBuilder {
    /// Rejection off, unit speed.
    pub fn new() -> Self {
        Self {
            config: deterministic_config(),
            rejections: None,
            drivers: Vec::new(),
            trips: Vec::new(),
        }
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn move_speed(mut self, speed: f64) -> Self {
        self.config = self.config.with_move_speed(speed);
        self
    }

    /// Replaces the random rejection policy with a fixed script.
    pub fn rejections(mut self, policy: ScriptedRejection) -> Self {
        self.rejections = Some(policy);
        self
    }

    pub fn driver(mut self, x: i64, y: i64) -> Self {
        self.drivers
            .push((GridPoint::new(x, y), DriverStatus::Available));
        self
    }

    pub fn offline_driver(mut self, x: i64, y: i64) -> Self {
        self.drivers.push((GridPoint::new(x, y), DriverStatus::Offline));
        self
    }

    /// Adds a rider and a waiting request for it.
    pub fn trip(mut self, pickup: (i64, i64), dropoff: (i64, i64)) -> Self {
        self.trips.push((pickup.into(), dropoff.into()));
        self
    }

    pub fn build(self) -> Fleet {
        let sim: Simulation = match self.rejections {
            Some(policy) => scripted_simulation(self.config, policy),
            None => Simulation::new(self.config).expect("fleet config should validate"),
        };

        let drivers = self
            .drivers
            .iter()
            .map(|&(position, status)| {
                sim.create_driver(position, status)
                    .expect("driver inside grid")
                    .id
            })
            .collect();

        let mut riders = Vec::new();
        let mut requests = Vec::new();
        for &(pickup, dropoff) in &self.trips {
            let rider = sim.create_rider(pickup, dropoff).expect("rider inside grid");
            riders.push(rider.id);
            requests.push(sim.create_request(rider.id).expect("rider exists").id);
        }

        Fleet {
            sim,
            drivers,
            riders,
            requests,
        }
    }
}

pub struct Fleet {
    pub sim: Simulation,
    pub drivers: Vec<DriverId>,
    pub riders: Vec<RiderId>,
    pub requests: Vec<RequestId>,
}

impl Fleet {
    pub fn position(&self, driver: DriverId) -> GridPoint {
        self.sim.driver(driver).expect("driver exists").position
    }

    /// Ticks `n` times and returns the driver's position after each tick.
    pub fn track(&self, driver: DriverId, n: usize) -> Vec<GridPoint> {
        (0..n)
            .map(|_| {
                self.sim.tick();
                self.position(driver)
            })
            .collect()
    }
}
