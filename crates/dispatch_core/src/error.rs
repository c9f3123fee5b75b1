//! Error taxonomy for store, dispatch and configuration operations.
//!
//! Every failing operation is rejected before any entity is touched, so an
//! error always means "no state change".

use std::fmt;

pub type Result<T> = core::result::Result<T, DispatchError>;

/// Which collection an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Driver,
    Rider,
    Request,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Driver => "driver",
            EntityKind::Rider => "rider",
            EntityKind::Request => "request",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The referenced id is not in the store.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    /// An entity status precondition does not hold.
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    /// Coordinates or configuration values outside the accepted domain.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl DispatchError {
    pub fn not_found(kind: EntityKind, id: u64) -> Self {
        DispatchError::NotFound { kind, id }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        DispatchError::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        DispatchError::InvalidInput {
            reason: reason.into(),
        }
    }
}
