//! Tick system: advances every on-trip driver one tick along its trip.
//!
//! A trip has two legs, driver to pickup and pickup to dropoff. Reaching the
//! pickup ends the tick for that driver; the dropoff leg starts on the next
//! tick, so a fast driver never passes through the pickup in one move.

use bevy_ecs::prelude::{Query, Res, ResMut, Resource};
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::SimulationClock;
use crate::ecs::{
    Driver, DriverId, DriverStatus, Position, RequestId, RequestStatus, RideRequest, TravelCredit,
};
use crate::grid::{step_toward, GridPoint};
use crate::store::EntityIndex;

/// Absorbs float error when whole units are taken out of the travel credit.
const CREDIT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickEventKind {
    ReachedPickup,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickEvent {
    pub driver_id: DriverId,
    pub request_id: RequestId,
    #[serde(rename = "event")]
    pub kind: TickEventKind,
}

/// New simulation time plus the events emitted by one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    pub time: u64,
    pub events: Vec<TickEvent>,
}

/// Grid units per tick for every driver.
#[derive(Debug, Clone, Copy, Resource)]
pub struct MovementSettings {
    pub move_speed: f64,
}

/// Output of the most recent tick.
#[derive(Debug, Default, Resource)]
pub struct TickReport(pub TickSummary);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct TripProgress {
    reached_pickup: bool,
    completed: bool,
}

/// Adds one tick of speed to the credit and takes out the whole units.
fn take_budget(credit: &mut f64, speed: f64) -> u64 {
    *credit += speed;
    let whole = (*credit + CREDIT_EPSILON).floor();
    *credit = (*credit - whole).max(0.0);
    whole as u64
}

fn advance_trip(
    driver: &mut Driver,
    position: &mut GridPoint,
    credit: &mut f64,
    request: &mut RideRequest,
    speed: f64,
) -> TripProgress {
    let mut progress = TripProgress::default();

    if !request.picked_up {
        if *position != request.pickup {
            let budget = take_budget(credit, speed);
            *position = step_toward(*position, request.pickup, budget);
            if *position != request.pickup {
                return progress;
            }
            request.picked_up = true;
            *credit = 0.0;
            progress.reached_pickup = true;
            if request.pickup != request.dropoff {
                return progress;
            }
        } else {
            // Assigned while standing on the pickup: no pickup leg to travel.
            request.picked_up = true;
            *credit = 0.0;
            progress.reached_pickup = true;
        }
    }

    if *position != request.dropoff {
        let budget = take_budget(credit, speed);
        *position = step_toward(*position, request.dropoff, budget);
        if *position != request.dropoff {
            return progress;
        }
    }

    request.complete();
    driver.release();
    *credit = 0.0;
    progress.completed = true;
    progress
}

pub fn tick_system(
    mut clock: ResMut<SimulationClock>,
    settings: Res<MovementSettings>,
    index: Res<EntityIndex>,
    mut report: ResMut<TickReport>,
    mut drivers: Query<(&mut Driver, &mut Position, &mut TravelCredit)>,
    mut requests: Query<&mut RideRequest>,
) {
    let now = clock.advance();
    report.0.time = now;
    report.0.events.clear();

    for (&driver_id, &driver_entity) in &index.drivers {
        let Ok((mut driver, mut position, mut credit)) = drivers.get_mut(driver_entity) else {
            continue;
        };
        if driver.status != DriverStatus::OnTrip {
            continue;
        }

        let Some(request_id) = driver.assigned_request else {
            warn!(driver = %driver_id, "on-trip driver without assignment skipped");
            continue;
        };
        let Some(&request_entity) = index.requests.get(&request_id) else {
            warn!(driver = %driver_id, request = %request_id, "assigned request missing");
            continue;
        };
        let Ok(mut request) = requests.get_mut(request_entity) else {
            warn!(driver = %driver_id, request = %request_id, "assigned request missing");
            continue;
        };
        if request.status != RequestStatus::Assigned {
            warn!(
                driver = %driver_id,
                request = %request_id,
                status = ?request.status,
                "assigned request not in assigned state"
            );
            continue;
        }

        let progress = advance_trip(
            &mut driver,
            &mut position.0,
            &mut credit.0,
            &mut request,
            settings.move_speed,
        );

        if progress.reached_pickup {
            debug!(time = now, driver = %driver_id, request = %request_id, "reached pickup");
            report.0.events.push(TickEvent {
                driver_id,
                request_id,
                kind: TickEventKind::ReachedPickup,
            });
        }
        if progress.completed {
            debug!(time = now, driver = %driver_id, request = %request_id, "trip completed");
            report.0.events.push(TickEvent {
                driver_id,
                request_id,
                kind: TickEventKind::Completed,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{RequestStatus, RiderId};

    fn assigned_trip(pickup: GridPoint, dropoff: GridPoint) -> (Driver, RideRequest) {
        let mut driver = Driver::new(DriverStatus::Available);
        let mut request = RideRequest::waiting(RiderId(1), pickup, dropoff);
        driver.assign(RequestId(1));
        request.assign(DriverId(1));
        (driver, request)
    }

    /// Ticks until completion and returns (pickup tick, completion tick).
    fn ticks_to_complete(
        start: GridPoint,
        pickup: GridPoint,
        dropoff: GridPoint,
        speed: f64,
    ) -> (u64, u64) {
        let (mut driver, mut request) = assigned_trip(pickup, dropoff);
        let mut position = start;
        let mut credit = 0.0;
        let mut pickup_tick = None;
        for tick in 1..=10_000 {
            let progress =
                advance_trip(&mut driver, &mut position, &mut credit, &mut request, speed);
            if progress.reached_pickup {
                pickup_tick = Some(tick);
            }
            if progress.completed {
                return (pickup_tick.expect("pickup before completion"), tick);
            }
        }
        panic!("trip did not complete");
    }

    #[test]
    fn budget_carries_fractions() {
        let mut credit = 0.0;
        assert_eq!(take_budget(&mut credit, 1.5), 1);
        assert_eq!(take_budget(&mut credit, 1.5), 2);
        assert_eq!(take_budget(&mut credit, 0.1), 0);
    }

    #[test]
    fn tenth_speed_accumulates_to_whole_units() {
        let mut credit = 0.0;
        let moved: u64 = (0..10).map(|_| take_budget(&mut credit, 0.1)).sum();
        assert_eq!(moved, 1);
    }

    #[test]
    fn unit_speed_takes_distance_ticks_per_leg() {
        let (pickup, done) = ticks_to_complete(
            GridPoint::new(0, 0),
            GridPoint::new(2, 2),
            GridPoint::new(8, 8),
            1.0,
        );
        assert_eq!(pickup, 4);
        assert_eq!(done, 16);
    }

    #[test]
    fn fractional_speed_rounds_each_leg_up() {
        // D = 5, E = 4 at speed 1.5: ceil(5/1.5) + ceil(4/1.5) = 4 + 3.
        let (pickup, done) = ticks_to_complete(
            GridPoint::new(0, 0),
            GridPoint::new(3, 2),
            GridPoint::new(5, 4),
            1.5,
        );
        assert_eq!(pickup, 4);
        assert_eq!(done, 7);
    }

    #[test]
    fn fast_driver_does_not_pass_through_pickup() {
        let (mut driver, mut request) = assigned_trip(GridPoint::new(1, 0), GridPoint::new(5, 0));
        let mut position = GridPoint::new(0, 0);
        let mut credit = 0.0;

        let progress = advance_trip(&mut driver, &mut position, &mut credit, &mut request, 10.0);
        assert!(progress.reached_pickup);
        assert!(!progress.completed);
        assert_eq!(position, GridPoint::new(1, 0));

        let progress = advance_trip(&mut driver, &mut position, &mut credit, &mut request, 10.0);
        assert!(progress.completed);
        assert_eq!(position, GridPoint::new(5, 0));
        assert_eq!(request.status, RequestStatus::Completed);
        assert_eq!(driver.status, DriverStatus::Available);
    }

    #[test]
    fn driver_on_pickup_starts_dropoff_leg_immediately() {
        let (pickup, done) = ticks_to_complete(
            GridPoint::new(3, 3),
            GridPoint::new(3, 3),
            GridPoint::new(3, 6),
            1.0,
        );
        assert_eq!(pickup, 1);
        assert_eq!(done, 3);
    }

    #[test]
    fn pickup_equal_to_dropoff_completes_on_arrival() {
        let (pickup, done) = ticks_to_complete(
            GridPoint::new(0, 0),
            GridPoint::new(2, 0),
            GridPoint::new(2, 0),
            1.0,
        );
        assert_eq!(pickup, 2);
        assert_eq!(done, 2);
    }
}
