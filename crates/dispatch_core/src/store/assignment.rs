use tracing::debug;

use crate::ecs::{
    Driver, DriverId, DriverStatus, RequestId, RequestSnapshot, RequestStatus, RideRequest,
    TravelCredit,
};
use crate::error::{DispatchError, Result};

use super::EntityStore;

impl EntityStore {
    /// Assigns a waiting request to an available driver, bypassing scoring.
    ///
    /// Counts as one accepted attempt.
    pub fn accept(
        &mut self,
        request_id: RequestId,
        driver_id: DriverId,
    ) -> Result<RequestSnapshot> {
        let request_entity = self.request_entity(request_id)?;
        let driver_entity = self.driver_entity(driver_id)?;

        let request_status = self.request_component(request_id)?.status;
        if request_status != RequestStatus::Waiting {
            return Err(DispatchError::invalid_state(format!(
                "request {request_id} is {request_status:?}, expected Waiting"
            )));
        }
        let driver_status = self.driver_component(driver_id)?.status;
        if driver_status != DriverStatus::Available {
            return Err(DispatchError::invalid_state(format!(
                "driver {driver_id} is {driver_status:?}, expected Available"
            )));
        }

        if let Some(mut request) = self.world.get_mut::<RideRequest>(request_entity) {
            request.attempts += 1;
            request.assign(driver_id);
        }
        if let Some(mut driver) = self.world.get_mut::<Driver>(driver_entity) {
            driver.assign(request_id);
        }
        if let Some(mut credit) = self.world.get_mut::<TravelCredit>(driver_entity) {
            credit.0 = 0.0;
        }

        debug!(request = %request_id, driver = %driver_id, "manual accept");
        self.request(request_id)
    }

    /// Moves a request to the terminal `rejected` state.
    ///
    /// The request must be waiting, or assigned to `driver_id`; in the latter
    /// case the driver goes back to `available`.
    pub fn reject(
        &mut self,
        request_id: RequestId,
        driver_id: DriverId,
    ) -> Result<RequestSnapshot> {
        let request_entity = self.request_entity(request_id)?;
        let driver_entity = self.driver_entity(driver_id)?;

        let request = *self.request_component(request_id)?;
        let release_driver = match (request.status, request.assigned_driver) {
            (RequestStatus::Waiting, _) => false,
            (RequestStatus::Assigned, Some(owner)) if owner == driver_id => true,
            (RequestStatus::Assigned, owner) => {
                return Err(DispatchError::invalid_state(format!(
                    "request {request_id} is assigned to {}, not driver {driver_id}",
                    owner.map_or_else(|| "no driver".to_string(), |id| format!("driver {id}"))
                )));
            }
            (status, _) => {
                return Err(DispatchError::invalid_state(format!(
                    "request {request_id} is {status:?} and cannot be rejected"
                )));
            }
        };

        if let Some(mut request) = self.world.get_mut::<RideRequest>(request_entity) {
            request.status = RequestStatus::Rejected;
            request.assigned_driver = None;
            request.picked_up = false;
        }
        if release_driver {
            if let Some(mut driver) = self.world.get_mut::<Driver>(driver_entity) {
                driver.release();
            }
            if let Some(mut credit) = self.world.get_mut::<TravelCredit>(driver_entity) {
                credit.0 = 0.0;
            }
        }

        debug!(request = %request_id, driver = %driver_id, release_driver, "manual reject");
        self.request(request_id)
    }
}
