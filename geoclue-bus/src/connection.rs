//! Connection traits implemented by bus transports.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::message::{BusMessage, HandlerResult, MatchRule, Signal};
use crate::path::ObjectPath;

/// Which bus to connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusType {
    #[default]
    Session,
    System,
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusType::Session => write!(f, "session"),
            BusType::System => write!(f, "system"),
        }
    }
}

/// An open connection to a bus
///
/// Incoming traffic is not pulled through this trait; the event loop that
/// owns the transport hands each message to the registered [`MessageFilter`]s.
pub trait BusConnection: Send {
    /// Unique name assigned to this connection by the bus, e.g. `:1.42`
    fn unique_name(&self) -> &str;

    /// Claim a well-known name
    fn request_name(&mut self, name: &str) -> Result<()>;

    /// Ask the bus to route messages matching `rule` to this connection
    fn add_match(&mut self, rule: &MatchRule) -> Result<()>;

    /// Export an object so method calls to `path` reach this connection
    fn register_object(&mut self, path: &ObjectPath) -> Result<()>;

    /// Withdraw an exported object; later calls to `path` fail
    fn unregister_object(&mut self, path: &ObjectPath) -> Result<()>;

    /// Broadcast a signal from this connection
    fn emit_signal(&mut self, signal: Signal) -> Result<()>;
}

/// Factory for bus connections
pub trait BusConnector {
    type Connection: BusConnection;

    fn connect(&self, bus: BusType) -> Result<Self::Connection>;
}

/// Observer of incoming bus traffic
pub trait MessageFilter {
    /// Inspect a message; return `Handled` only to stop other filters seeing it
    fn filter(&mut self, message: &BusMessage) -> HandlerResult;
}
