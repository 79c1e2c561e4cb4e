//! Bus messages as seen by filters and method handlers.
//!
//! Only the shapes the broker needs are modelled: signals, method calls and
//! method replies, with a small set of argument types. The wire encoding is
//! left to the transport.

use std::collections::BTreeMap;
use std::fmt;

use crate::path::ObjectPath;

/// Well-known name, path and interface of the bus daemon itself
pub const DBUS_SERVICE: &str = "org.freedesktop.DBus";
pub const DBUS_PATH: &str = "/org/freedesktop/DBus";
pub const DBUS_INTERFACE: &str = "org.freedesktop.DBus";

/// Member name of the ownership-change signal
pub const NAME_OWNER_CHANGED: &str = "NameOwnerChanged";

/// A single message argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusValue {
    Str(String),
    U32(u32),
    I32(i32),
    Bool(bool),
    Path(ObjectPath),
    /// A string to string dictionary (`a{ss}`)
    Dict(BTreeMap<String, String>),
}

impl BusValue {
    /// Return the string payload if this is a string argument
    pub fn as_str(&self) -> Option<&str> {
        match self {
            BusValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for BusValue {
    fn from(value: &str) -> Self {
        BusValue::Str(value.to_string())
    }
}

impl From<String> for BusValue {
    fn from(value: String) -> Self {
        BusValue::Str(value)
    }
}

/// Kind of a bus message, used by match rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Signal,
    MethodCall,
}

impl MessageType {
    fn as_str(&self) -> &'static str {
        match self {
            MessageType::Signal => "signal",
            MessageType::MethodCall => "method_call",
        }
    }
}

/// A broadcast or unicast signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub sender: Option<String>,
    pub path: ObjectPath,
    pub interface: String,
    pub member: String,
    pub args: Vec<BusValue>,
}

impl Signal {
    /// Create a signal with no sender and no arguments
    pub fn new(path: ObjectPath, interface: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            sender: None,
            path,
            interface: interface.into(),
            member: member.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    pub fn with_arg(mut self, arg: impl Into<BusValue>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the sending peer
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Check interface and member in one go
    pub fn is(&self, interface: &str, member: &str) -> bool {
        self.interface == interface && self.member == member
    }
}

/// An incoming method call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// Unique name of the caller, filled in by the bus daemon
    pub sender: Option<String>,
    pub path: ObjectPath,
    pub interface: Option<String>,
    pub member: String,
    pub args: Vec<BusValue>,
}

impl MethodCall {
    pub fn new(path: ObjectPath, interface: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            sender: None,
            path,
            interface: Some(interface.into()),
            member: member.into(),
            args: Vec::new(),
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_arg(mut self, arg: impl Into<BusValue>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Reply to a method call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodReply {
    Return(Vec<BusValue>),
    Error { name: String, message: String },
}

impl MethodReply {
    /// A successful reply carrying a single value
    pub fn single(value: impl Into<BusValue>) -> Self {
        MethodReply::Return(vec![value.into()])
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        MethodReply::Error {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Anything a filter may be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMessage {
    Signal(Signal),
    MethodCall(MethodCall),
}

impl BusMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            BusMessage::Signal(_) => MessageType::Signal,
            BusMessage::MethodCall(_) => MessageType::MethodCall,
        }
    }

    pub fn as_signal(&self) -> Option<&Signal> {
        match self {
            BusMessage::Signal(signal) => Some(signal),
            _ => None,
        }
    }
}

impl From<Signal> for BusMessage {
    fn from(signal: Signal) -> Self {
        BusMessage::Signal(signal)
    }
}

impl From<MethodCall> for BusMessage {
    fn from(call: MethodCall) -> Self {
        BusMessage::MethodCall(call)
    }
}

/// Outcome reported by a message filter
///
/// Filters that merely observe traffic must answer `NotYetHandled` so that
/// other filters on the same connection still see the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerResult {
    Handled,
    NotYetHandled,
}

/// Decoded `NameOwnerChanged(name, old_owner, new_owner)` signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameOwnerChanged {
    pub name: String,
    pub old_owner: String,
    /// Empty when the name lost its owner
    pub new_owner: String,
}

impl NameOwnerChanged {
    pub fn new(
        name: impl Into<String>,
        old_owner: impl Into<String>,
        new_owner: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            old_owner: old_owner.into(),
            new_owner: new_owner.into(),
        }
    }

    /// Decode a message, returning `None` for anything that is not an
    /// ownership-change signal with string arguments
    ///
    /// A missing third argument is read as an empty new owner.
    pub fn from_message(message: &BusMessage) -> Option<Self> {
        let signal = message.as_signal()?;
        if !signal.is(DBUS_INTERFACE, NAME_OWNER_CHANGED) {
            return None;
        }

        let mut args = signal.args.iter();
        let name = args.next()?.as_str()?;
        let old_owner = args.next()?.as_str()?;
        let new_owner = match args.next() {
            Some(value) => value.as_str()?,
            None => "",
        };
        if args.next().is_some() {
            return None;
        }

        Some(Self::new(name, old_owner, new_owner))
    }

    /// Encode as the signal the bus daemon would broadcast
    pub fn to_signal(&self) -> Signal {
        Signal::new(ObjectPath::from_static(DBUS_PATH), DBUS_INTERFACE, NAME_OWNER_CHANGED)
            .with_sender(DBUS_SERVICE)
            .with_arg(self.name.as_str())
            .with_arg(self.old_owner.as_str())
            .with_arg(self.new_owner.as_str())
    }

    /// The name had an owner and now has none
    pub fn is_departure(&self) -> bool {
        !self.old_owner.is_empty() && self.new_owner.is_empty()
    }

    /// The name had no owner and now has one
    pub fn is_acquisition(&self) -> bool {
        self.old_owner.is_empty() && !self.new_owner.is_empty()
    }

    /// Ownership moved from one peer to another
    pub fn is_handover(&self) -> bool {
        !self.old_owner.is_empty() && !self.new_owner.is_empty()
    }
}

impl From<NameOwnerChanged> for BusMessage {
    fn from(change: NameOwnerChanged) -> Self {
        BusMessage::Signal(change.to_signal())
    }
}

/// A subscription rule in the bus daemon's textual match syntax
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRule {
    pub message_type: Option<MessageType>,
    pub sender: Option<String>,
    pub interface: Option<String>,
    pub member: Option<String>,
    pub path: Option<ObjectPath>,
}

impl MatchRule {
    /// Every `NameOwnerChanged` signal, whichever name it concerns
    pub fn name_owner_changed() -> Self {
        Self {
            message_type: Some(MessageType::Signal),
            interface: Some(DBUS_INTERFACE.to_string()),
            member: Some(NAME_OWNER_CHANGED.to_string()),
            ..Default::default()
        }
    }

    /// Check whether a message would be routed to us under this rule
    pub fn matches(&self, message: &BusMessage) -> bool {
        if let Some(message_type) = self.message_type {
            if message.message_type() != message_type {
                return false;
            }
        }

        let (sender, path, interface, member) = match message {
            BusMessage::Signal(s) => (s.sender.as_deref(), &s.path, Some(s.interface.as_str()), &s.member),
            BusMessage::MethodCall(c) => (c.sender.as_deref(), &c.path, c.interface.as_deref(), &c.member),
        };

        self.sender.as_deref().map_or(true, |want| sender == Some(want))
            && self.path.as_ref().map_or(true, |want| path == want)
            && self.interface.as_deref().map_or(true, |want| interface == Some(want))
            && self.member.as_deref().map_or(true, |want| member == want)
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(message_type) = self.message_type {
            parts.push(format!("type='{}'", message_type.as_str()));
        }
        if let Some(sender) = &self.sender {
            parts.push(format!("sender='{}'", sender));
        }
        if let Some(interface) = &self.interface {
            parts.push(format!("interface='{}'", interface));
        }
        if let Some(member) = &self.member {
            parts.push(format!("member='{}'", member));
        }
        if let Some(path) = &self.path {
            parts.push(format!("path='{}'", path));
        }
        f.write_str(&parts.join(","))
    }
}
