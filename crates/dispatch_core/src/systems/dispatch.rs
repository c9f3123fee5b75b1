//! Dispatch system: assigns waiting requests to available drivers.
//!
//! Requests are processed oldest first. Each one scores the drivers still
//! available in this pass, offers the request to the best one, and on
//! rejection retries with the remaining candidates. A driver assigned in this
//! pass leaves the pool for every later request of the same pass.

use bevy_ecs::prelude::{Query, Res, ResMut, Resource};
use tracing::debug;

use crate::ecs::{Driver, DriverStatus, Position, RequestStatus, RideRequest, TravelCredit};
use crate::matching::{
    DispatchOutcome, MatchCandidate, MatchingAlgorithmResource, RejectionPolicyResource,
};
use crate::store::EntityIndex;

/// Outcomes of the most recent dispatch pass, in processing order.
#[derive(Debug, Default, Resource)]
pub struct DispatchReport(pub Vec<DispatchOutcome>);

pub fn dispatch_system(
    index: Res<EntityIndex>,
    matching: Res<MatchingAlgorithmResource>,
    mut rejection: ResMut<RejectionPolicyResource>,
    mut report: ResMut<DispatchReport>,
    mut requests: Query<&mut RideRequest>,
    mut drivers: Query<(&mut Driver, &Position, &mut TravelCredit)>,
) {
    report.0.clear();

    let mut pool: Vec<MatchCandidate> = index
        .drivers
        .iter()
        .filter_map(|(&driver_id, &entity)| {
            let (driver, position, _) = drivers.get(entity).ok()?;
            (driver.status == DriverStatus::Available).then(|| MatchCandidate {
                driver: driver_id,
                position: position.0,
                load: driver.load(),
            })
        })
        .collect();

    for (&request_id, &request_entity) in &index.requests {
        let Ok(mut request) = requests.get_mut(request_entity) else {
            continue;
        };
        if request.status != RequestStatus::Waiting {
            continue;
        }

        if pool.is_empty() {
            debug!(request = %request_id, "no drivers available");
            report.0.push(DispatchOutcome::NoDriversAvailable { request_id });
            continue;
        }

        // Rejections only shrink this request's view of the pool.
        let mut candidates = pool.clone();
        let outcome = loop {
            let Some(driver_id) = matching.find_match(request.pickup, &candidates) else {
                request.status = RequestStatus::Failed;
                debug!(
                    request = %request_id,
                    attempts = request.attempts,
                    "all candidates rejected"
                );
                break DispatchOutcome::Failed {
                    request_id,
                    attempts: request.attempts,
                };
            };
            candidates.retain(|candidate| candidate.driver != driver_id);
            request.attempts += 1;

            if rejection.0.should_reject(request_id, driver_id) {
                debug!(request = %request_id, driver = %driver_id, "driver rejected assignment");
                continue;
            }

            let Some(&driver_entity) = index.drivers.get(&driver_id) else {
                continue;
            };
            let Ok((mut driver, _, mut credit)) = drivers.get_mut(driver_entity) else {
                continue;
            };
            driver.assign(request_id);
            credit.0 = 0.0;
            request.assign(driver_id);
            pool.retain(|candidate| candidate.driver != driver_id);

            debug!(
                request = %request_id,
                driver = %driver_id,
                attempts = request.attempts,
                "assigned"
            );
            break DispatchOutcome::Assigned {
                request_id,
                driver_id,
                attempts: request.attempts,
            };
        };
        report.0.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};

    use crate::ecs::{DriverId, RequestId, RiderId};
    use crate::grid::GridPoint;
    use crate::matching::{CostBasedMatching, RandomRejection};
    use crate::test_helpers::ScriptedRejection;

    fn spawn_driver(world: &mut World, id: u64, at: GridPoint) {
        let entity = world
            .spawn((
                DriverId(id),
                Driver::new(DriverStatus::Available),
                Position(at),
                TravelCredit::default(),
            ))
            .id();
        world
            .resource_mut::<EntityIndex>()
            .drivers
            .insert(DriverId(id), entity);
    }

    fn spawn_request(world: &mut World, id: u64, pickup: GridPoint) {
        let entity = world
            .spawn((
                RequestId(id),
                RideRequest::waiting(RiderId(1), pickup, GridPoint::new(9, 9)),
            ))
            .id();
        world
            .resource_mut::<EntityIndex>()
            .requests
            .insert(RequestId(id), entity);
    }

    fn dispatch_world(rejections: RejectionPolicyResource) -> World {
        let mut world = World::new();
        world.insert_resource(EntityIndex::default());
        world.insert_resource(DispatchReport::default());
        world.insert_resource(MatchingAlgorithmResource::new(Box::new(
            CostBasedMatching::new(1.0, 0.1),
        )));
        world.insert_resource(rejections);
        world
    }

    fn run(world: &mut World) -> Vec<DispatchOutcome> {
        let mut schedule = Schedule::default();
        schedule.add_systems(dispatch_system);
        schedule.run(world);
        std::mem::take(&mut world.resource_mut::<DispatchReport>().0)
    }

    #[test]
    fn assigns_nearest_driver_once_per_pass() {
        let mut world = dispatch_world(RejectionPolicyResource::new(Box::new(
            RandomRejection::new(0.0, Some(7)),
        )));
        spawn_driver(&mut world, 1, GridPoint::new(0, 0));
        spawn_driver(&mut world, 2, GridPoint::new(6, 6));
        spawn_request(&mut world, 1, GridPoint::new(1, 1));
        spawn_request(&mut world, 2, GridPoint::new(1, 0));

        let outcomes = run(&mut world);

        assert_eq!(
            outcomes,
            vec![
                DispatchOutcome::Assigned {
                    request_id: RequestId(1),
                    driver_id: DriverId(1),
                    attempts: 1,
                },
                DispatchOutcome::Assigned {
                    request_id: RequestId(2),
                    driver_id: DriverId(2),
                    attempts: 1,
                },
            ]
        );
    }

    #[test]
    fn rejection_retries_with_next_best_driver() {
        let mut world = dispatch_world(RejectionPolicyResource::new(Box::new(
            ScriptedRejection::new([true, false]),
        )));
        spawn_driver(&mut world, 1, GridPoint::new(0, 0));
        spawn_driver(&mut world, 2, GridPoint::new(4, 4));
        spawn_request(&mut world, 1, GridPoint::new(1, 1));

        let outcomes = run(&mut world);

        assert_eq!(
            outcomes,
            vec![DispatchOutcome::Assigned {
                request_id: RequestId(1),
                driver_id: DriverId(2),
                attempts: 2,
            }]
        );
    }

    #[test]
    fn exhausted_candidates_fail_the_request() {
        let mut world = dispatch_world(RejectionPolicyResource::new(Box::new(
            ScriptedRejection::always(),
        )));
        spawn_driver(&mut world, 1, GridPoint::new(0, 0));
        spawn_driver(&mut world, 2, GridPoint::new(4, 4));
        spawn_request(&mut world, 1, GridPoint::new(1, 1));

        let outcomes = run(&mut world);

        assert_eq!(
            outcomes,
            vec![DispatchOutcome::Failed {
                request_id: RequestId(1),
                attempts: 2,
            }]
        );
        let request = world.query::<&RideRequest>().single(&world);
        assert_eq!(request.status, RequestStatus::Failed);
    }

    #[test]
    fn no_drivers_leaves_request_waiting_without_attempts() {
        let mut world = dispatch_world(RejectionPolicyResource::new(Box::new(
            RandomRejection::new(0.0, Some(7)),
        )));
        spawn_request(&mut world, 1, GridPoint::new(1, 1));

        let outcomes = run(&mut world);

        assert_eq!(
            outcomes,
            vec![DispatchOutcome::NoDriversAvailable {
                request_id: RequestId(1)
            }]
        );
        let request = world.query::<&RideRequest>().single(&world);
        assert_eq!(request.status, RequestStatus::Waiting);
        assert_eq!(request.attempts, 0);
    }
}
