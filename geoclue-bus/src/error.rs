//! Error types for bus operations.

use thiserror::Error;

/// Errors that can occur while talking to the bus
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus daemon could not be reached
    #[error("Failed to connect to the {bus} bus: {reason}")]
    ConnectionFailed {
        /// Human readable bus name ("session" or "system")
        bus: String,
        /// Reason reported by the transport
        reason: String,
    },

    /// A string was not a valid object path
    #[error("Invalid object path '{0}'")]
    InvalidObjectPath(String),

    /// An object is already exported at this path
    #[error("Object already registered at {0}")]
    ObjectAlreadyRegistered(String),

    /// No object is exported at this path
    #[error("No object registered at {0}")]
    ObjectNotRegistered(String),

    /// The well-known name is owned by another peer
    #[error("Bus name {0} is already owned")]
    NameTaken(String),

    /// The connection has been closed
    #[error("Bus connection closed")]
    Disconnected,
}

/// Result type for bus operations
pub type Result<T> = std::result::Result<T, BusError>;
