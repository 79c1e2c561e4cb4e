//! # geoclue-master
//!
//! Session broker for geoclue location providers.
//!
//! Applications call `Create` on the master object to obtain a session of
//! their own. The broker keeps track of which bus peer owns which session,
//! destroys sessions when their owner leaves the bus, and selects providers
//! from the descriptor directory according to each session's requirements.
//!
//! ## Usage
//!
//! ```rust
//! use geoclue_bus::{LocalBus, MethodCall, NameOwnerChanged, ObjectPath};
//! use geoclue_master::prelude::*;
//! use geoclue_providers::{ConnectivityStatus, InMemoryDescriptors, StaticConnectivity};
//!
//! let bus = LocalBus::new();
//! let master = MasterService::start_with_source(
//!     MasterConfig::default(),
//!     &bus,
//!     StaticConnectivity::shared(ConnectivityStatus::Online),
//!     Box::new(InMemoryDescriptors::new()),
//! )?;
//! let handle = MasterHandle::spawn(master)?;
//!
//! let client = bus.add_peer();
//! let call = MethodCall::new(
//!     ObjectPath::new("/org/freedesktop/Geoclue/Master").unwrap(),
//!     MASTER_INTERFACE,
//!     CREATE_METHOD,
//! )
//! .with_sender(client.as_str());
//! let path = handle.create_session(call)?;
//! assert_eq!(handle.stats()?.sessions, 1);
//!
//! // The client disconnects; its session goes with it
//! for change in bus.remove_peer(&client) {
//!     handle.deliver(change)?;
//! }
//! assert_eq!(handle.stats()?.sessions, 0);
//! # let _ = path;
//! # Ok::<(), geoclue_master::MasterError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`SessionRegistry`] allocates session paths and destroys sessions,
//!   releasing the provider registry when the last one goes
//! - [`PresenceMonitor`] turns `NameOwnerChanged` signals into departures
//! - [`MasterService`] ties both to a bus connection
//! - [`MasterHandle`] runs a service on a worker thread behind a sync API

pub mod config;
pub mod error;
pub mod handle;
pub mod logging;
pub mod monitor;
pub mod service;
pub mod session;
pub mod worker;

pub use config::{MasterConfig, ReloadPolicy};
pub use error::{MasterError, Result};
pub use handle::MasterHandle;
pub use monitor::{Departure, PresenceMonitor};
pub use service::{MasterService, MasterStats, CREATE_METHOD, MASTER_INTERFACE, OPTIONS_CHANGED};
pub use session::{Session, SessionRegistry};

/// Prelude module for convenient imports
///
/// ```rust
/// use geoclue_master::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        MasterConfig, MasterError, MasterHandle, MasterService, MasterStats, ReloadPolicy,
        Result, CREATE_METHOD, MASTER_INTERFACE,
    };
}
