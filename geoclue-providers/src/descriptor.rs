//! Provider descriptor parsing and validation.
//!
//! A descriptor is a small TOML document declaring one provider:
//!
//! ```toml
//! [provider]
//! name = "Hostip"
//! service = "org.freedesktop.Geoclue.Providers.Hostip"
//! path = "/org/freedesktop/Geoclue/Providers/Hostip"
//! accuracy = "locality"
//! interfaces = ["position", "address"]
//! provides = ["updates"]
//! requires = ["network"]
//! ```

use std::collections::BTreeSet;

use geoclue_bus::ObjectPath;
use serde::Deserialize;

use crate::error::{ProviderError, Result};
use crate::types::{AccuracyLevel, Capability, Interface, Resource};

#[derive(Debug, Deserialize)]
struct DescriptorFile {
    provider: ProviderDescriptor,
}

/// Parsed contents of a descriptor file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderDescriptor {
    /// Human readable provider name
    pub name: String,
    /// Well-known bus name the provider is reachable under
    pub service: String,
    /// Object path of the provider's main object
    pub path: String,
    #[serde(default)]
    pub accuracy: AccuracyLevel,
    #[serde(default)]
    pub interfaces: BTreeSet<Interface>,
    #[serde(default)]
    pub provides: BTreeSet<Capability>,
    #[serde(default)]
    pub requires: BTreeSet<Resource>,
}

impl ProviderDescriptor {
    /// Parse and validate descriptor text
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier of the descriptor, used in error messages
    /// * `text` - TOML document with a `[provider]` table
    ///
    /// # Errors
    ///
    /// `DescriptorParse` for malformed TOML or missing keys, `InvalidDescriptor`
    /// when the provider it describes could never be used.
    pub fn from_toml(id: &str, text: &str) -> Result<Self> {
        let file: DescriptorFile = toml::from_str(text).map_err(|source| ProviderError::DescriptorParse {
            id: id.to_string(),
            source,
        })?;

        file.provider.validate(id)?;
        Ok(file.provider)
    }

    fn validate(&self, id: &str) -> Result<()> {
        let invalid = |reason: &str| ProviderError::InvalidDescriptor {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("empty provider name"));
        }
        if self.service.trim().is_empty() || !self.service.contains('.') {
            return Err(invalid("service must be a well-known bus name"));
        }
        if !ObjectPath::is_valid(&self.path) {
            return Err(invalid("path is not a valid object path"));
        }
        if self.interfaces.is_empty() {
            return Err(invalid("provider declares no interfaces"));
        }

        Ok(())
    }
}
