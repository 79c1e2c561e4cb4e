use geoclue_bus::BusError;
use geoclue_providers::ProviderError;
use thiserror::Error;

/// Errors returned by the session broker
#[derive(Error, Debug)]
pub enum MasterError {
    /// The broker never obtained a bus connection
    #[error("Master is not connected to the bus")]
    NotConnected,

    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// No live session has this object path
    #[error("Session {0} not found")]
    SessionNotFound(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The background worker is gone
    #[error("Master worker has shut down")]
    WorkerDisconnected,
}

/// Result type for broker operations
pub type Result<T> = std::result::Result<T, MasterError>;
