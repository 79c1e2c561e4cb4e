//! Network connectivity status shared by every loaded provider.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// Coarse state of the host's network connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityStatus {
    #[default]
    Unknown,
    Offline,
    Acquiring,
    Online,
}

/// Source of connectivity information
///
/// Backed by a network manager in a full deployment. One instance is created
/// at startup and every provider record holds a clone of the same handle.
pub trait Connectivity: fmt::Debug + Send + Sync {
    fn status(&self) -> ConnectivityStatus;
}

/// Handle type held by provider records
pub type SharedConnectivity = Arc<dyn Connectivity>;

/// Connectivity whose status is set by hand
#[derive(Debug, Default)]
pub struct StaticConnectivity {
    status: RwLock<ConnectivityStatus>,
}

impl StaticConnectivity {
    pub fn new(status: ConnectivityStatus) -> Self {
        Self {
            status: RwLock::new(status),
        }
    }

    /// Build a shared handle
    pub fn shared(status: ConnectivityStatus) -> Arc<Self> {
        Arc::new(Self::new(status))
    }

    pub fn set_status(&self, status: ConnectivityStatus) {
        let mut current = self.status.write();
        if *current != status {
            tracing::debug!("Connectivity status {:?} -> {:?}", *current, status);
            *current = status;
        }
    }
}

impl Connectivity for StaticConnectivity {
    fn status(&self) -> ConnectivityStatus {
        *self.status.read()
    }
}
