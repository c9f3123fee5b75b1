//! Status aggregation: point-in-time counts over the whole store.

use serde::Serialize;

use crate::ecs::{DriverStatus, RequestStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriverCounts {
    pub total: usize,
    pub available: usize,
    pub on_trip: usize,
    pub offline: usize,
}

impl DriverCounts {
    pub fn add(&mut self, status: DriverStatus) {
        self.total += 1;
        match status {
            DriverStatus::Available => self.available += 1,
            DriverStatus::OnTrip => self.on_trip += 1,
            DriverStatus::Offline => self.offline += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiderCounts {
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestCounts {
    pub total: usize,
    pub waiting: usize,
    pub assigned: usize,
    pub rejected: usize,
    pub completed: usize,
    pub failed: usize,
}

impl RequestCounts {
    pub fn add(&mut self, status: RequestStatus) {
        self.total += 1;
        match status {
            RequestStatus::Waiting => self.waiting += 1,
            RequestStatus::Assigned => self.assigned += 1,
            RequestStatus::Rejected => self.rejected += 1,
            RequestStatus::Completed => self.completed += 1,
            RequestStatus::Failed => self.failed += 1,
        }
    }

    /// Requests that dispatch or tick can still move forward.
    pub fn open(&self) -> usize {
        self.waiting + self.assigned
    }
}

/// Aggregated counts at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub current_time: u64,
    pub drivers: DriverCounts,
    pub riders: RiderCounts,
    pub requests: RequestCounts,
}
