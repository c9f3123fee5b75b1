use tracing::{debug, info};

use crate::ecs::{
    Driver, DriverId, DriverSnapshot, DriverStatus, Position, RequestId, RequestSnapshot,
    RideRequest, Rider, RiderId, RiderSnapshot, TravelCredit,
};
use crate::error::{DispatchError, EntityKind, Result};
use crate::grid::GridPoint;
use crate::telemetry::StatusCounts;

use super::{EntityIndex, EntityStore, IdAllocator};

impl EntityStore {
    fn check_in_bounds(&self, label: &str, point: GridPoint) -> Result<()> {
        if self.bounds.contains(point) {
            Ok(())
        } else {
            Err(DispatchError::invalid_input(format!(
                "{label} {point} is outside the {}x{} grid",
                self.bounds.width, self.bounds.height
            )))
        }
    }

    pub fn create_driver(
        &mut self,
        position: GridPoint,
        status: DriverStatus,
    ) -> Result<DriverSnapshot> {
        self.check_in_bounds("driver position", position)?;
        if status == DriverStatus::OnTrip {
            return Err(DispatchError::invalid_input(
                "drivers are created available or offline",
            ));
        }

        let id = self.world.resource_mut::<IdAllocator>().next_driver();
        let driver = Driver::new(status);
        let entity = self
            .world
            .spawn((id, driver, Position(position), TravelCredit::default()))
            .id();
        self.world
            .resource_mut::<EntityIndex>()
            .drivers
            .insert(id, entity);

        debug!(driver = %id, %position, ?status, "driver created");
        Ok(DriverSnapshot::from_parts(id, &driver, &Position(position)))
    }

    pub fn create_rider(&mut self, pickup: GridPoint, dropoff: GridPoint) -> Result<RiderSnapshot> {
        self.check_in_bounds("pickup", pickup)?;
        self.check_in_bounds("dropoff", dropoff)?;

        let id = self.world.resource_mut::<IdAllocator>().next_rider();
        let rider = Rider { pickup, dropoff };
        let entity = self.world.spawn((id, rider)).id();
        self.world
            .resource_mut::<EntityIndex>()
            .riders
            .insert(id, entity);

        debug!(rider = %id, %pickup, %dropoff, "rider created");
        Ok(RiderSnapshot::from_parts(id, &rider))
    }

    /// Opens a waiting request with the rider's current pickup and dropoff.
    pub fn create_request(&mut self, rider_id: RiderId) -> Result<RequestSnapshot> {
        let rider = *self.rider_component(rider_id)?;

        let id = self.world.resource_mut::<IdAllocator>().next_request();
        let request = RideRequest::waiting(rider_id, rider.pickup, rider.dropoff);
        let entity = self.world.spawn((id, request)).id();
        self.world
            .resource_mut::<EntityIndex>()
            .requests
            .insert(id, entity);

        debug!(request = %id, rider = %rider_id, "request created");
        Ok(RequestSnapshot::from_parts(id, &request))
    }

    pub fn driver(&self, id: DriverId) -> Result<DriverSnapshot> {
        let entity = self.driver_entity(id)?;
        self.driver_snapshot(id, entity)
            .ok_or_else(|| DispatchError::not_found(EntityKind::Driver, id.0))
    }

    pub fn rider(&self, id: RiderId) -> Result<RiderSnapshot> {
        self.rider_component(id)
            .map(|rider| RiderSnapshot::from_parts(id, rider))
    }

    pub fn request(&self, id: RequestId) -> Result<RequestSnapshot> {
        self.request_component(id)
            .map(|request| RequestSnapshot::from_parts(id, request))
    }

    /// All drivers in ascending id order.
    pub fn drivers(&self) -> Vec<DriverSnapshot> {
        self.index()
            .drivers
            .iter()
            .filter_map(|(&id, &entity)| self.driver_snapshot(id, entity))
            .collect()
    }

    /// All riders in ascending id order.
    pub fn riders(&self) -> Vec<RiderSnapshot> {
        self.index()
            .riders
            .iter()
            .filter_map(|(&id, &entity)| {
                self.world
                    .get::<Rider>(entity)
                    .map(|rider| RiderSnapshot::from_parts(id, rider))
            })
            .collect()
    }

    /// All requests in ascending id order.
    pub fn requests(&self) -> Vec<RequestSnapshot> {
        self.index()
            .requests
            .iter()
            .filter_map(|(&id, &entity)| {
                self.world
                    .get::<RideRequest>(entity)
                    .map(|request| RequestSnapshot::from_parts(id, request))
            })
            .collect()
    }

    /// Toggles a driver between `available` and `offline`.
    ///
    /// On-trip status is owned by dispatch and tick: it can neither be set
    /// here nor changed while the driver holds an assignment.
    pub fn update_driver_status(
        &mut self,
        id: DriverId,
        status: DriverStatus,
    ) -> Result<DriverSnapshot> {
        let entity = self.driver_entity(id)?;
        if status == DriverStatus::OnTrip {
            return Err(DispatchError::invalid_input(
                "on_trip is only reachable through an assignment",
            ));
        }
        let current = self
            .world
            .get::<Driver>(entity)
            .ok_or_else(|| DispatchError::not_found(EntityKind::Driver, id.0))?;
        if current.status == DriverStatus::OnTrip {
            return Err(DispatchError::invalid_state(format!(
                "driver {id} is on a trip"
            )));
        }

        if let Some(mut driver) = self.world.get_mut::<Driver>(entity) {
            driver.status = status;
        }
        debug!(driver = %id, ?status, "driver status updated");
        self.driver(id)
    }

    /// Replaces both rider coordinates. Existing requests keep their copies.
    pub fn update_rider(
        &mut self,
        id: RiderId,
        pickup: GridPoint,
        dropoff: GridPoint,
    ) -> Result<RiderSnapshot> {
        let entity = self.rider_entity(id)?;
        self.check_in_bounds("pickup", pickup)?;
        self.check_in_bounds("dropoff", dropoff)?;

        if let Some(mut rider) = self.world.get_mut::<Rider>(entity) {
            *rider = Rider { pickup, dropoff };
        }
        debug!(rider = %id, %pickup, %dropoff, "rider updated");
        self.rider(id)
    }

    /// Removes a driver. A request it was serving goes back to `waiting`.
    pub fn delete_driver(&mut self, id: DriverId) -> Result<DriverSnapshot> {
        let entity = self.driver_entity(id)?;
        let snapshot = self.driver(id)?;

        if let Some(request_id) = snapshot.assigned_request_id {
            let request_entity = self.index().requests.get(&request_id).copied();
            if let Some(request_entity) = request_entity {
                if let Some(mut request) = self.world.get_mut::<RideRequest>(request_entity) {
                    request.requeue();
                    info!(driver = %id, request = %request_id, "request returned to waiting");
                }
            }
        }

        self.world.despawn(entity);
        self.world
            .resource_mut::<EntityIndex>()
            .drivers
            .remove(&id);
        debug!(driver = %id, "driver deleted");
        Ok(snapshot)
    }

    /// Removes a rider. Requests created from it are left untouched.
    pub fn delete_rider(&mut self, id: RiderId) -> Result<RiderSnapshot> {
        let entity = self.rider_entity(id)?;
        let snapshot = self.rider(id)?;

        self.world.despawn(entity);
        self.world
            .resource_mut::<EntityIndex>()
            .riders
            .remove(&id);
        debug!(rider = %id, "rider deleted");
        Ok(snapshot)
    }

    pub fn status(&self) -> StatusCounts {
        let mut counts = StatusCounts {
            current_time: self.now(),
            ..StatusCounts::default()
        };
        for driver in self.drivers() {
            counts.drivers.add(driver.status);
        }
        counts.riders.total = self.index().riders.len();
        for request in self.requests() {
            counts.requests.add(request.status);
        }
        counts
    }

    pub(crate) fn driver_entity(&self, id: DriverId) -> Result<bevy_ecs::entity::Entity> {
        self.index()
            .drivers
            .get(&id)
            .copied()
            .ok_or_else(|| DispatchError::not_found(EntityKind::Driver, id.0))
    }

    pub(crate) fn rider_entity(&self, id: RiderId) -> Result<bevy_ecs::entity::Entity> {
        self.index()
            .riders
            .get(&id)
            .copied()
            .ok_or_else(|| DispatchError::not_found(EntityKind::Rider, id.0))
    }

    pub(crate) fn request_entity(&self, id: RequestId) -> Result<bevy_ecs::entity::Entity> {
        self.index()
            .requests
            .get(&id)
            .copied()
            .ok_or_else(|| DispatchError::not_found(EntityKind::Request, id.0))
    }

    fn rider_component(&self, id: RiderId) -> Result<&Rider> {
        let entity = self.rider_entity(id)?;
        self.world
            .get::<Rider>(entity)
            .ok_or_else(|| DispatchError::not_found(EntityKind::Rider, id.0))
    }

    pub(crate) fn request_component(&self, id: RequestId) -> Result<&RideRequest> {
        let entity = self.request_entity(id)?;
        self.world
            .get::<RideRequest>(entity)
            .ok_or_else(|| DispatchError::not_found(EntityKind::Request, id.0))
    }

    pub(crate) fn driver_component(&self, id: DriverId) -> Result<&Driver> {
        let entity = self.driver_entity(id)?;
        self.world
            .get::<Driver>(entity)
            .ok_or_else(|| DispatchError::not_found(EntityKind::Driver, id.0))
    }

    fn driver_snapshot(
        &self,
        id: DriverId,
        entity: bevy_ecs::entity::Entity,
    ) -> Option<DriverSnapshot> {
        let driver = self.world.get::<Driver>(entity)?;
        let position = self.world.get::<Position>(entity)?;
        Some(DriverSnapshot::from_parts(id, driver, position))
    }
}
