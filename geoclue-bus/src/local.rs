//! In-process bus.
//!
//! `LocalBus` plays the role of the bus daemon for embedding and tests: it
//! hands out unique names, tracks well-known name ownership, exported objects
//! and match rules, and records every emitted signal. It does not deliver
//! messages by itself. Ownership changes are returned to the caller as
//! [`NameOwnerChanged`] values so the event loop under test decides when
//! filters see them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::connection::{BusConnection, BusConnector, BusType};
use crate::error::{BusError, Result};
use crate::message::{BusMessage, MatchRule, NameOwnerChanged, Signal};
use crate::path::ObjectPath;

#[derive(Debug, Default)]
struct LocalBusState {
    available: bool,
    next_serial: u64,
    /// Unique names of connected peers
    peers: BTreeSet<String>,
    /// Well-known name -> unique name of owner
    names: BTreeMap<String, String>,
    /// Exported object -> unique name of exporter
    objects: BTreeMap<ObjectPath, String>,
    match_rules: Vec<(String, MatchRule)>,
    emitted: Vec<Signal>,
}

impl LocalBusState {
    fn allocate_peer(&mut self) -> String {
        let name = format!(":1.{}", self.next_serial);
        self.next_serial += 1;
        self.peers.insert(name.clone());
        name
    }
}

/// Shared handle to an in-process bus
#[derive(Debug, Clone)]
pub struct LocalBus {
    state: Arc<Mutex<LocalBusState>>,
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBus {
    /// A bus that accepts connections
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LocalBusState {
                available: true,
                ..Default::default()
            })),
        }
    }

    /// A bus whose daemon cannot be reached; every `connect` fails
    pub fn unavailable() -> Self {
        let bus = Self::new();
        bus.set_available(false);
        bus
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().available = available;
    }

    /// Attach a bare peer (a client that only makes calls) and return its unique name
    pub fn add_peer(&self) -> String {
        self.state.lock().allocate_peer()
    }

    /// Disconnect a peer, dropping everything it owned
    ///
    /// Returns the ownership changes the daemon broadcasts, well-known names
    /// first and the unique name last.
    pub fn remove_peer(&self, unique_name: &str) -> Vec<NameOwnerChanged> {
        let mut state = self.state.lock();
        if !state.peers.remove(unique_name) {
            return Vec::new();
        }

        let lost: Vec<String> = state
            .names
            .iter()
            .filter(|(_, owner)| owner.as_str() == unique_name)
            .map(|(name, _)| name.clone())
            .collect();

        let mut changes = Vec::with_capacity(lost.len() + 1);
        for name in lost {
            state.names.remove(&name);
            changes.push(NameOwnerChanged::new(name, unique_name, ""));
        }

        state.objects.retain(|_, owner| owner != unique_name);
        state.match_rules.retain(|(owner, _)| owner != unique_name);

        changes.push(NameOwnerChanged::new(unique_name, unique_name, ""));
        tracing::debug!("Peer {} left the local bus", unique_name);
        changes
    }

    pub fn is_connected(&self, unique_name: &str) -> bool {
        self.state.lock().peers.contains(unique_name)
    }

    /// Current owner of a well-known name
    pub fn owner_of(&self, name: &str) -> Option<String> {
        self.state.lock().names.get(name).cloned()
    }

    pub fn is_registered(&self, path: &ObjectPath) -> bool {
        self.state.lock().objects.contains_key(path)
    }

    /// All exported object paths, sorted
    pub fn registered_objects(&self) -> Vec<ObjectPath> {
        self.state.lock().objects.keys().cloned().collect()
    }

    pub fn match_rules(&self) -> Vec<MatchRule> {
        self.state
            .lock()
            .match_rules
            .iter()
            .map(|(_, rule)| rule.clone())
            .collect()
    }

    /// Whether any connection subscribed to this message
    pub fn is_routed(&self, message: &BusMessage) -> bool {
        self.state
            .lock()
            .match_rules
            .iter()
            .any(|(_, rule)| rule.matches(message))
    }

    /// Every signal emitted so far, oldest first
    pub fn emitted_signals(&self) -> Vec<Signal> {
        self.state.lock().emitted.clone()
    }
}

impl BusConnector for LocalBus {
    type Connection = LocalConnection;

    fn connect(&self, bus: BusType) -> Result<LocalConnection> {
        let mut state = self.state.lock();
        if !state.available {
            return Err(BusError::ConnectionFailed {
                bus: bus.to_string(),
                reason: "local bus is not accepting connections".to_string(),
            });
        }

        let unique_name = state.allocate_peer();
        tracing::debug!("Connection {} opened on local {} bus", unique_name, bus);

        Ok(LocalConnection {
            unique_name,
            state: Arc::clone(&self.state),
        })
    }
}

/// A connection to a [`LocalBus`]
#[derive(Debug)]
pub struct LocalConnection {
    unique_name: String,
    state: Arc<Mutex<LocalBusState>>,
}

impl LocalConnection {
    fn ensure_connected(&self, state: &LocalBusState) -> Result<()> {
        if state.peers.contains(&self.unique_name) {
            Ok(())
        } else {
            Err(BusError::Disconnected)
        }
    }
}

impl BusConnection for LocalConnection {
    fn unique_name(&self) -> &str {
        &self.unique_name
    }

    fn request_name(&mut self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_connected(&state)?;

        if let Some(owner) = state.names.get(name) {
            if owner != &self.unique_name {
                return Err(BusError::NameTaken(name.to_string()));
            }
            return Ok(());
        }

        state.names.insert(name.to_string(), self.unique_name.clone());
        Ok(())
    }

    fn add_match(&mut self, rule: &MatchRule) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_connected(&state)?;
        state.match_rules.push((self.unique_name.clone(), rule.clone()));
        Ok(())
    }

    fn register_object(&mut self, path: &ObjectPath) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_connected(&state)?;

        if state.objects.contains_key(path) {
            return Err(BusError::ObjectAlreadyRegistered(path.to_string()));
        }
        state.objects.insert(path.clone(), self.unique_name.clone());
        Ok(())
    }

    fn unregister_object(&mut self, path: &ObjectPath) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_connected(&state)?;

        let exported_here = state
            .objects
            .get(path)
            .map_or(false, |owner| owner == &self.unique_name);
        if !exported_here {
            return Err(BusError::ObjectNotRegistered(path.to_string()));
        }

        state.objects.remove(path);
        Ok(())
    }

    fn emit_signal(&mut self, mut signal: Signal) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_connected(&state)?;

        signal.sender = Some(self.unique_name.clone());
        state.emitted.push(signal);
        Ok(())
    }
}
