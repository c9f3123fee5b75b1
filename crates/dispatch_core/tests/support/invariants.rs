use std::collections::HashSet;

use dispatch_core::ecs::{DriverSnapshot, DriverStatus, RequestSnapshot, RequestStatus};
use dispatch_core::{Simulation, StoreGuard};

/// Drivers and requests read under one guard acquisition.
pub fn consistent_view<G: StoreGuard>(
    sim: &Simulation<G>,
) -> (Vec<DriverSnapshot>, Vec<RequestSnapshot>) {
    sim.with_store(|store| (store.drivers(), store.requests()))
}

/// Driver and request assignment links agree in both directions.
pub fn assert_assignment_invariants<G: StoreGuard>(sim: &Simulation<G>) {
    let (drivers, requests) = consistent_view(sim);

    for driver in &drivers {
        match driver.status {
            DriverStatus::OnTrip => {
                let request_id = driver
                    .assigned_request_id
                    .unwrap_or_else(|| panic!("on-trip driver {} has no request", driver.id));
                let request = requests
                    .iter()
                    .find(|request| request.id == request_id)
                    .unwrap_or_else(|| panic!("driver {} holds unknown request", driver.id));
                assert_eq!(request.status, RequestStatus::Assigned);
                assert_eq!(request.assigned_driver_id, Some(driver.id));
            }
            DriverStatus::Available | DriverStatus::Offline => {
                assert_eq!(driver.assigned_request_id, None, "driver {}", driver.id);
            }
        }
    }

    let mut owners = HashSet::new();
    for request in &requests {
        match request.status {
            RequestStatus::Assigned => {
                let driver_id = request
                    .assigned_driver_id
                    .unwrap_or_else(|| panic!("assigned request {} has no driver", request.id));
                assert!(owners.insert(driver_id), "driver {driver_id} assigned twice");
                let driver = drivers
                    .iter()
                    .find(|driver| driver.id == driver_id)
                    .unwrap_or_else(|| panic!("request {} held by unknown driver", request.id));
                assert_eq!(driver.status, DriverStatus::OnTrip);
                assert_eq!(driver.assigned_request_id, Some(request.id));
            }
            _ => assert_eq!(request.assigned_driver_id, None, "request {}", request.id),
        }
    }
}
