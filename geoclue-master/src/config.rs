//! Configuration for the geoclue master
//!
//! Controls which bus the broker joins, the names and paths it exports, where
//! provider descriptors are read from, and when they are read.

use std::fs;
use std::path::{Path, PathBuf};

use geoclue_bus::{BusType, ObjectPath};
use geoclue_providers::PROVIDER_EXTENSION;
use serde::{Deserialize, Serialize};

use crate::error::{MasterError, Result};

/// When the provider registry is (re)loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Load at startup, and again whenever a session is created while the
    /// registry is empty
    #[default]
    OnDemand,
    /// Load once at startup only
    StartupOnly,
}

/// Configuration for the MasterService
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    /// Bus to connect to
    /// Default: session
    pub bus: BusType,

    /// Well-known name claimed on the bus
    /// Default: org.freedesktop.Geoclue.Master
    pub service_name: String,

    /// Object path of the master object
    /// Default: /org/freedesktop/Geoclue/Master
    pub master_path: String,

    /// Session paths are this prefix followed by a decimal serial
    /// Default: /org/freedesktop/Geoclue/Master/client
    pub session_path_prefix: String,

    /// Directory scanned for provider descriptors
    /// Default: /usr/share/geoclue-providers
    pub providers_dir: PathBuf,

    /// File extension that marks a descriptor, leading dot included
    /// Default: .provider
    pub provider_extension: String,

    /// Default: on_demand
    pub reload_policy: ReloadPolicy,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            bus: BusType::Session,
            service_name: "org.freedesktop.Geoclue.Master".to_string(),
            master_path: "/org/freedesktop/Geoclue/Master".to_string(),
            session_path_prefix: "/org/freedesktop/Geoclue/Master/client".to_string(),
            providers_dir: PathBuf::from("/usr/share/geoclue-providers"),
            provider_extension: PROVIDER_EXTENSION.to_string(),
            reload_policy: ReloadPolicy::OnDemand,
        }
    }
}

impl MasterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for a system-wide broker
    pub fn system() -> Self {
        Self {
            bus: BusType::System,
            ..Default::default()
        }
    }

    /// Configuration that reads provider descriptors exactly once
    pub fn load_once() -> Self {
        Self {
            reload_policy: ReloadPolicy::StartupOnly,
            ..Default::default()
        }
    }

    /// Parse a TOML document; absent keys keep their defaults
    ///
    /// ```rust
    /// use geoclue_master::{MasterConfig, ReloadPolicy};
    ///
    /// let config = MasterConfig::from_toml_str(r#"
    ///     bus = "system"
    ///     reload_policy = "startup_only"
    /// "#).unwrap();
    /// assert_eq!(config.reload_policy, ReloadPolicy::StartupOnly);
    /// assert_eq!(config.service_name, "org.freedesktop.Geoclue.Master");
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| MasterError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            MasterError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if !self.service_name.contains('.') || self.service_name.starts_with('.') {
            return Err(MasterError::Configuration(format!(
                "Service name {:?} is not a well-known bus name",
                self.service_name
            )));
        }

        if !ObjectPath::is_valid(&self.master_path) {
            return Err(MasterError::Configuration(format!(
                "Master path {:?} is not a valid object path",
                self.master_path
            )));
        }

        if !ObjectPath::is_valid(&self.session_path_prefix) {
            return Err(MasterError::Configuration(format!(
                "Session path prefix {:?} is not a valid object path",
                self.session_path_prefix
            )));
        }

        let extension = self.provider_extension.as_str();
        if extension.len() < 2 || !extension.starts_with('.') || extension[1..].contains('.') {
            return Err(MasterError::Configuration(format!(
                "Provider extension {:?} must be a single dot followed by a suffix",
                extension
            )));
        }

        Ok(())
    }

    pub(crate) fn master_object_path(&self) -> Result<ObjectPath> {
        ObjectPath::new(self.master_path.as_str())
            .map_err(|e| MasterError::Configuration(e.to_string()))
    }

    pub(crate) fn session_prefix_path(&self) -> Result<ObjectPath> {
        ObjectPath::new(self.session_path_prefix.as_str())
            .map_err(|e| MasterError::Configuration(e.to_string()))
    }

    pub fn with_bus(mut self, bus: BusType) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn with_master_path(mut self, path: impl Into<String>) -> Self {
        self.master_path = path.into();
        self
    }

    pub fn with_session_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.session_path_prefix = prefix.into();
        self
    }

    pub fn with_providers_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.providers_dir = dir.into();
        self
    }

    pub fn with_provider_extension(mut self, extension: impl Into<String>) -> Self {
        self.provider_extension = extension.into();
        self
    }

    pub fn with_reload_policy(mut self, policy: ReloadPolicy) -> Self {
        self.reload_policy = policy;
        self
    }
}
