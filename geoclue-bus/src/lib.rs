//! # geoclue-bus
//!
//! Bus vocabulary shared by the geoclue master crates.
//!
//! The broker only needs a thin slice of an inter-process bus: unique and
//! well-known names, exported object paths, signals (in particular the bus
//! daemon's `NameOwnerChanged`), method calls and replies. This crate models
//! that slice and defines the traits a transport implements:
//!
//! - [`BusConnector`] opens a [`BusConnection`] to the session or system bus
//! - [`BusConnection`] claims names, subscribes match rules, exports objects
//!   and emits signals
//! - [`MessageFilter`] is implemented by anything that observes incoming
//!   traffic
//!
//! [`LocalBus`] is an in-process implementation that records everything it
//! is asked to do, so that brokers can be exercised without a bus daemon.
//!
//! ```rust
//! use geoclue_bus::{BusConnection, BusConnector, BusType, LocalBus, ObjectPath};
//!
//! let bus = LocalBus::new();
//! let mut conn = bus.connect(BusType::Session).unwrap();
//! let path = ObjectPath::new("/org/example/Thing").unwrap();
//! conn.register_object(&path).unwrap();
//! assert!(bus.is_registered(&path));
//! ```

mod connection;
mod error;
mod local;
mod message;
mod path;

pub use connection::{BusConnection, BusConnector, BusType, MessageFilter};
pub use error::{BusError, Result};
pub use local::{LocalBus, LocalConnection};
pub use message::{
    BusMessage, BusValue, HandlerResult, MatchRule, MessageType, MethodCall, MethodReply,
    NameOwnerChanged, Signal, DBUS_INTERFACE, DBUS_PATH, DBUS_SERVICE, NAME_OWNER_CHANGED,
};
pub use path::ObjectPath;
