use std::fmt;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::grid::GridPoint;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Component, Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Driver identifier; assigned once, never reused.
    DriverId
);
entity_id!(
    /// Rider identifier; assigned once, never reused.
    RiderId
);
entity_id!(
    /// Ride request identifier; assigned once, never reused.
    RequestId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Available,
    OnTrip,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Waiting,
    Assigned,
    Rejected,
    Completed,
    Failed,
}

impl RequestStatus {
    /// `Rejected`, `Completed` and `Failed` are never left once entered.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Rejected | RequestStatus::Completed | RequestStatus::Failed
        )
    }
}

/// Driver state. `status == OnTrip` exactly when `assigned_request` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Driver {
    pub status: DriverStatus,
    pub assigned_request: Option<RequestId>,
}

impl Driver {
    pub fn new(status: DriverStatus) -> Self {
        Self {
            status,
            assigned_request: None,
        }
    }

    /// Number of requests currently held; binary today.
    pub fn load(&self) -> u32 {
        u32::from(self.assigned_request.is_some())
    }

    pub fn assign(&mut self, request: RequestId) {
        self.status = DriverStatus::OnTrip;
        self.assigned_request = Some(request);
    }

    /// Returns the driver to the available pool, dropping any assignment.
    pub fn release(&mut self) {
        self.status = DriverStatus::Available;
        self.assigned_request = None;
    }
}

/// Current grid position of a driver; only the tick system moves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Position(pub GridPoint);

/// Unspent fractional movement carried between ticks of the current leg.
#[derive(Debug, Clone, Copy, PartialEq, Default, Component)]
pub struct TravelCredit(pub f64);

/// Rider template: requests copy these coordinates at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Rider {
    pub pickup: GridPoint,
    pub dropoff: GridPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct RideRequest {
    pub rider: RiderId,
    pub pickup: GridPoint,
    pub dropoff: GridPoint,
    pub status: RequestStatus,
    /// Assignment attempts made, accepted or rejected.
    pub attempts: u32,
    /// Set only while `status == Assigned`.
    pub assigned_driver: Option<DriverId>,
    /// The assigned driver has reached the pickup point.
    pub picked_up: bool,
}

impl RideRequest {
    pub fn waiting(rider: RiderId, pickup: GridPoint, dropoff: GridPoint) -> Self {
        Self {
            rider,
            pickup,
            dropoff,
            status: RequestStatus::Waiting,
            attempts: 0,
            assigned_driver: None,
            picked_up: false,
        }
    }

    pub fn assign(&mut self, driver: DriverId) {
        self.status = RequestStatus::Assigned;
        self.assigned_driver = Some(driver);
        self.picked_up = false;
    }

    pub fn complete(&mut self) {
        self.status = RequestStatus::Completed;
        self.assigned_driver = None;
    }

    /// Puts an assigned request back in the queue, keeping its attempt count.
    pub fn requeue(&mut self) {
        self.status = RequestStatus::Waiting;
        self.assigned_driver = None;
        self.picked_up = false;
    }
}

/// Read-only view of a driver handed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSnapshot {
    pub id: DriverId,
    pub position: GridPoint,
    pub status: DriverStatus,
    pub assigned_request_id: Option<RequestId>,
}

/// Read-only view of a rider handed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderSnapshot {
    pub id: RiderId,
    pub pickup: GridPoint,
    pub dropoff: GridPoint,
}

/// Read-only view of a ride request handed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    pub id: RequestId,
    pub rider_id: RiderId,
    pub pickup: GridPoint,
    pub dropoff: GridPoint,
    pub status: RequestStatus,
    pub attempts: u32,
    pub assigned_driver_id: Option<DriverId>,
    pub picked_up: bool,
}

impl DriverSnapshot {
    pub fn from_parts(id: DriverId, driver: &Driver, position: &Position) -> Self {
        Self {
            id,
            position: position.0,
            status: driver.status,
            assigned_request_id: driver.assigned_request,
        }
    }
}

impl RiderSnapshot {
    pub fn from_parts(id: RiderId, rider: &Rider) -> Self {
        Self {
            id,
            pickup: rider.pickup,
            dropoff: rider.dropoff,
        }
    }
}

impl RequestSnapshot {
    pub fn from_parts(id: RequestId, request: &RideRequest) -> Self {
        Self {
            id,
            rider_id: request.rider,
            pickup: request.pickup,
            dropoff: request.dropoff,
            status: request.status,
            attempts: request.attempts,
            assigned_driver_id: request.assigned_driver,
            picked_up: request.picked_up,
        }
    }
}
