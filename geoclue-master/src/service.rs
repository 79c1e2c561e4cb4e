//! The session broker.
//!
//! `MasterService` owns the bus connection, the session registry and the
//! provider registry. It answers `Create` calls on the master object, tears
//! sessions down when their owners leave the bus, and serves provider
//! selection for each session.

use std::collections::BTreeMap;
use std::fmt;

use geoclue_bus::{
    BusConnection, BusConnector, BusMessage, BusValue, HandlerResult, MessageFilter, MethodCall,
    MethodReply, ObjectPath, Signal,
};
use geoclue_providers::{
    Constraints, DescriptorDir, DescriptorSource, LoadReport, ProviderRecord, ProviderRegistry,
    SharedConnectivity,
};

use crate::config::{MasterConfig, ReloadPolicy};
use crate::error::{MasterError, Result};
use crate::monitor::PresenceMonitor;
use crate::session::{Session, SessionRegistry};

/// Interface of the master object
pub const MASTER_INTERFACE: &str = "org.freedesktop.Geoclue.Master";

/// Method that creates a session
pub const CREATE_METHOD: &str = "Create";

/// Signal broadcast when client options change
pub const OPTIONS_CHANGED: &str = "OptionsChanged";

const ERROR_FAILED: &str = "org.freedesktop.DBus.Error.Failed";

/// Point-in-time counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterStats {
    pub sessions: usize,
    pub providers: usize,
    /// Times the provider registry was released because no session was left
    pub releases: u64,
    pub next_serial: u64,
    pub connected: bool,
}

impl fmt::Display for MasterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sessions, {} providers ({} releases), next serial {}, {}",
            self.sessions,
            self.providers,
            self.releases,
            self.next_serial,
            if self.connected { "connected" } else { "not connected" }
        )
    }
}

/// Session broker bound to one bus connection
///
/// # Example
///
/// ```rust
/// use geoclue_bus::{LocalBus, MethodCall, ObjectPath};
/// use geoclue_master::{MasterConfig, MasterService, MASTER_INTERFACE, CREATE_METHOD};
/// use geoclue_providers::{ConnectivityStatus, InMemoryDescriptors, StaticConnectivity};
///
/// let bus = LocalBus::new();
/// let mut master = MasterService::start_with_source(
///     MasterConfig::default(),
///     &bus,
///     StaticConnectivity::shared(ConnectivityStatus::Online),
///     Box::new(InMemoryDescriptors::new()),
/// ).unwrap();
///
/// let client = bus.add_peer();
/// let call = MethodCall::new(
///     ObjectPath::new("/org/freedesktop/Geoclue/Master").unwrap(),
///     MASTER_INTERFACE,
///     CREATE_METHOD,
/// )
/// .with_sender(client);
///
/// let path = master.create_session(&call).unwrap();
/// assert_eq!(path, "/org/freedesktop/Geoclue/Master/client0");
/// ```
pub struct MasterService<C: BusConnection> {
    config: MasterConfig,
    connection: Option<C>,
    master_path: ObjectPath,
    sessions: SessionRegistry,
    providers: ProviderRegistry,
    source: Box<dyn DescriptorSource + Send>,
    connectivity: SharedConnectivity,
    monitor: PresenceMonitor,
}

impl<C: BusConnection> MasterService<C> {
    /// Start a broker reading descriptors from `config.providers_dir`
    pub fn start<B>(
        config: MasterConfig,
        connector: &B,
        connectivity: SharedConnectivity,
    ) -> Result<Self>
    where
        B: BusConnector<Connection = C>,
    {
        let source = DescriptorDir::with_extension(
            config.providers_dir.clone(),
            config.provider_extension.as_str(),
        );
        Self::start_with_source(config, connector, connectivity, Box::new(source))
    }

    /// Start a broker reading descriptors from `source`
    ///
    /// Only an invalid configuration is an error. When the bus cannot be
    /// joined the failure is logged and the returned service is not
    /// functional: it holds no providers and refuses to create sessions.
    pub fn start_with_source<B>(
        config: MasterConfig,
        connector: &B,
        connectivity: SharedConnectivity,
        source: Box<dyn DescriptorSource + Send>,
    ) -> Result<Self>
    where
        B: BusConnector<Connection = C>,
    {
        config.validate()?;

        let mut service = Self {
            master_path: config.master_object_path()?,
            sessions: SessionRegistry::new(config.session_prefix_path()?),
            providers: ProviderRegistry::new(),
            connection: None,
            monitor: PresenceMonitor::new(),
            config,
            source,
            connectivity,
        };

        match service.join_bus(connector) {
            Ok(connection) => {
                tracing::info!(
                    "Geoclue master on {} bus as {} ({})",
                    service.config.bus,
                    connection.unique_name(),
                    service.config.service_name
                );
                service.connection = Some(connection);
            }
            Err(e) => {
                tracing::error!("Could not get {} bus: {}", service.config.bus, e);
                return Ok(service);
            }
        }

        service.reload_providers();
        Ok(service)
    }

    fn join_bus<B>(&self, connector: &B) -> Result<C>
    where
        B: BusConnector<Connection = C>,
    {
        let mut connection = connector.connect(self.config.bus)?;
        connection.request_name(&self.config.service_name)?;
        connection.add_match(&self.monitor.match_rule())?;
        connection.register_object(&self.master_path)?;
        Ok(connection)
    }

    /// Whether startup obtained a bus connection
    pub fn is_functional(&self) -> bool {
        self.connection.is_some()
    }

    /// Replace the provider registry with what the descriptor source holds now
    ///
    /// Live sessions never lose their providers this way: a reload that finds
    /// nothing usable keeps the current records.
    pub fn reload_providers(&mut self) -> LoadReport {
        self.providers.load(self.source.as_ref(), &self.connectivity)
    }

    /// Create a session for the caller and export it on the bus
    ///
    /// Returns the object path of the new session.
    pub fn create_session(&mut self, call: &MethodCall) -> Result<String> {
        if self.connection.is_none() {
            return Err(MasterError::NotConnected);
        }
        // An unknown caller still gets a session; it is never matched by a departure
        let owner = call.sender.clone().unwrap_or_default();

        if self.providers.is_empty() && self.config.reload_policy == ReloadPolicy::OnDemand {
            tracing::debug!("Provider registry is empty, reloading");
            self.reload_providers();
        }

        let path = self.sessions.create(owner.as_str()).path().clone();
        let registered = match self.connection.as_mut() {
            Some(connection) => connection.register_object(&path).map_err(MasterError::from),
            None => Err(MasterError::NotConnected),
        };
        if let Err(e) = registered {
            tracing::warn!("Cannot export session {} for {}: {}", path, owner, e);
            self.sessions.destroy(&path, &mut self.providers);
            return Err(e);
        }

        tracing::info!("Session {} created for {}", path, owner);
        Ok(path.into_string())
    }

    /// Route a method call addressed to the master object
    ///
    /// Returns `None` for calls this service does not implement.
    pub fn handle_method_call(&mut self, call: &MethodCall) -> Option<MethodReply> {
        if call.path != self.master_path || call.member != CREATE_METHOD {
            return None;
        }
        if call.interface.as_deref().map_or(false, |iface| iface != MASTER_INTERFACE) {
            return None;
        }

        Some(match self.create_session(call) {
            Ok(path) => MethodReply::single(path),
            Err(e) => MethodReply::error(ERROR_FAILED, e.to_string()),
        })
    }

    /// Destroy every session owned by `name`
    ///
    /// Returns how many sessions were destroyed.
    pub fn handle_departure(&mut self, name: &str) -> usize {
        let mut destroyed = 0;
        while let Some(path) = self.sessions.find(name).map(|s| s.path().clone()) {
            self.teardown(&path);
            destroyed += 1;
        }

        if destroyed > 0 {
            tracing::debug!("Removed {} sessions of departed client {}", destroyed, name);
        }
        destroyed
    }

    /// Destroy a session at the client's request
    pub fn release_session(&mut self, path: &str) -> Result<()> {
        let path = self.session_path(path)?;
        self.teardown(&path);
        tracing::info!("Session {} released", path);
        Ok(())
    }

    fn teardown(&mut self, path: &ObjectPath) {
        match self.connection.as_mut() {
            Some(connection) => {
                if let Err(e) = connection.unregister_object(path) {
                    tracing::warn!("Cannot unregister client {}: {}", path, e);
                }
            }
            None => tracing::warn!("Cannot unregister client {}: no bus connection", path),
        }
        self.sessions.destroy(path, &mut self.providers);
    }

    fn session_path(&self, path: &str) -> Result<ObjectPath> {
        ObjectPath::new(path)
            .ok()
            .filter(|path| self.sessions.get(path).is_some())
            .ok_or_else(|| MasterError::SessionNotFound(path.to_string()))
    }

    /// Run `hook` when the session at `path` is destroyed
    pub fn on_session_teardown(
        &mut self,
        path: &str,
        hook: impl FnOnce(&Session) + Send + 'static,
    ) -> Result<()> {
        self.session_mut(path)?.on_teardown(hook);
        Ok(())
    }

    pub fn set_requirements(&mut self, path: &str, requirements: Constraints) -> Result<()> {
        tracing::debug!("Session {} requires {}", path, requirements);
        self.session_mut(path)?.set_requirements(requirements);
        Ok(())
    }

    fn session_mut(&mut self, path: &str) -> Result<&mut Session> {
        let object_path = self.session_path(path)?;
        self.sessions
            .get_mut(&object_path)
            .ok_or_else(|| MasterError::SessionNotFound(path.to_string()))
    }

    /// Providers satisfying the requirements of the session at `path`
    pub fn providers_for(&self, path: &str) -> Result<Vec<&ProviderRecord>> {
        let object_path = self.session_path(path)?;
        let session = self
            .sessions
            .get(&object_path)
            .ok_or_else(|| MasterError::SessionNotFound(path.to_string()))?;
        Ok(self.providers.filter(session.requirements()))
    }

    /// Broadcast `OptionsChanged` from the master object
    pub fn emit_options_changed(&mut self, options: BTreeMap<String, String>) -> Result<()> {
        let connection = self.connection.as_mut().ok_or(MasterError::NotConnected)?;
        tracing::debug!("Emitting {} with {} options", OPTIONS_CHANGED, options.len());

        let signal = Signal::new(self.master_path.clone(), MASTER_INTERFACE, OPTIONS_CHANGED)
            .with_arg(BusValue::Dict(options));
        connection.emit_signal(signal)?;
        Ok(())
    }

    pub fn stats(&self) -> MasterStats {
        MasterStats {
            sessions: self.sessions.len(),
            providers: self.providers.len(),
            releases: self.providers.release_count(),
            next_serial: self.sessions.next_serial(),
            connected: self.is_functional(),
        }
    }

    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn connection(&self) -> Option<&C> {
        self.connection.as_ref()
    }
}

impl<C: BusConnection> MessageFilter for MasterService<C> {
    /// Watch for clients leaving the bus; never consumes the message
    fn filter(&mut self, message: &BusMessage) -> HandlerResult {
        if let Some(departure) = self.monitor.inspect(message) {
            self.handle_departure(&departure.name);
        }
        HandlerResult::NotYetHandled
    }
}
