//! # Error Types
//!
//! Errors for the checked failure paths of the store.
//!
//! Absence (stale handle, missing component) is not an error: it is reported
//! through `Option` and `bool` returns on [`World`](crate::World).

use thiserror::Error;

/// Errors that can occur while configuring or growing a world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Every entity slot is live and none can be recycled.
    #[error("entity capacity exceeded: world holds at most {capacity} entities")]
    CapacityExceeded {
        /// The world's entity ceiling.
        capacity: usize,
    },

    /// More distinct component types were used than a mask can represent.
    #[error("component type limit reached: at most {limit} component types per process")]
    ComponentLimit {
        /// The maximum number of component types.
        limit: usize,
    },

    /// Invalid configuration value or file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for store operations.
pub type EcsResult<T> = Result<T, EcsError>;
