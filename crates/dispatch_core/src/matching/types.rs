use serde::Serialize;

use crate::ecs::{DriverId, RequestId};
use crate::grid::GridPoint;

/// An available driver considered for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate {
    pub driver: DriverId,
    pub position: GridPoint,
    /// Requests currently held by the driver.
    pub load: u32,
}

/// Result of dispatching one waiting request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Assigned {
        request_id: RequestId,
        driver_id: DriverId,
        attempts: u32,
    },
    /// Every candidate rejected the request; it is now `failed`.
    Failed { request_id: RequestId, attempts: u32 },
    /// No available drivers; the request stays `waiting` for the next call.
    NoDriversAvailable { request_id: RequestId },
}

impl DispatchOutcome {
    pub fn request_id(&self) -> RequestId {
        match *self {
            DispatchOutcome::Assigned { request_id, .. }
            | DispatchOutcome::Failed { request_id, .. }
            | DispatchOutcome::NoDriversAvailable { request_id } => request_id,
        }
    }
}
