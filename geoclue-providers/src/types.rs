//! Capability vocabulary and selection constraints.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How precise a provider's fixes are expected to be, coarsest first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyLevel {
    #[default]
    None,
    Country,
    Region,
    #[serde(alias = "city")]
    Locality,
    #[serde(alias = "postalcode")]
    PostalCode,
    Street,
    Detailed,
}

impl AccuracyLevel {
    /// Alias used by clients that think in cities rather than localities
    pub const CITY: AccuracyLevel = AccuracyLevel::Locality;
}

impl fmt::Display for AccuracyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccuracyLevel::None => "none",
            AccuracyLevel::Country => "country",
            AccuracyLevel::Region => "region",
            AccuracyLevel::Locality => "locality",
            AccuracyLevel::PostalCode => "postal_code",
            AccuracyLevel::Street => "street",
            AccuracyLevel::Detailed => "detailed",
        };
        f.write_str(name)
    }
}

/// Location interfaces a provider can implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interface {
    Position,
    Address,
    Velocity,
    Geocode,
    ReverseGeocode,
}

/// Resources a provider consumes while running
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Network,
    Cell,
    Gps,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Network, Resource::Cell, Resource::Gps];

    /// Every resource, i.e. "no restriction"
    pub fn all() -> BTreeSet<Resource> {
        Self::ALL.into_iter().collect()
    }
}

/// Optional behaviours a provider advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Emits change signals instead of only answering queries
    Updates,
    /// Results may be cached by the master
    Cacheable,
}

/// What a client is willing to accept from a provider
///
/// The default accepts any provider: no interfaces required, no minimum
/// accuracy, no update requirement and every resource allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Interfaces the provider must implement, all of them
    pub interfaces: BTreeSet<Interface>,
    pub min_accuracy: AccuracyLevel,
    /// Only accept providers that emit updates
    pub require_updates: bool,
    /// Resources the provider may use; anything else disqualifies it
    pub allowed_resources: BTreeSet<Resource>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            interfaces: BTreeSet::new(),
            min_accuracy: AccuracyLevel::None,
            require_updates: false,
            allowed_resources: Resource::all(),
        }
    }
}

impl Constraints {
    pub fn new(
        interfaces: impl IntoIterator<Item = Interface>,
        min_accuracy: AccuracyLevel,
        require_updates: bool,
        allowed_resources: impl IntoIterator<Item = Resource>,
    ) -> Self {
        Self {
            interfaces: interfaces.into_iter().collect(),
            min_accuracy,
            require_updates,
            allowed_resources: allowed_resources.into_iter().collect(),
        }
    }

    /// Accept anything
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interfaces.insert(interface);
        self
    }

    pub fn with_min_accuracy(mut self, level: AccuracyLevel) -> Self {
        self.min_accuracy = level;
        self
    }

    pub fn with_updates(mut self, required: bool) -> Self {
        self.require_updates = required;
        self
    }

    pub fn with_allowed_resources(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.allowed_resources = resources.into_iter().collect();
        self
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "interfaces={:?} min_accuracy={} updates={} allowed={:?}",
            self.interfaces, self.min_accuracy, self.require_updates, self.allowed_resources
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_ordering() {
        assert!(AccuracyLevel::None < AccuracyLevel::Country);
        assert!(AccuracyLevel::Country < AccuracyLevel::Locality);
        assert!(AccuracyLevel::Locality < AccuracyLevel::Street);
        assert!(AccuracyLevel::Street < AccuracyLevel::Detailed);
        assert_eq!(AccuracyLevel::CITY, AccuracyLevel::Locality);
    }

    #[test]
    fn test_default_constraints_accept_everything() {
        let constraints = Constraints::default();
        assert!(constraints.interfaces.is_empty());
        assert_eq!(constraints.min_accuracy, AccuracyLevel::None);
        assert!(!constraints.require_updates);
        assert_eq!(constraints.allowed_resources.len(), Resource::ALL.len());
        assert_eq!(constraints, Constraints::any());
    }

    #[test]
    fn test_builder() {
        let constraints = Constraints::any()
            .with_interface(Interface::Position)
            .with_min_accuracy(AccuracyLevel::Street)
            .with_updates(true)
            .with_allowed_resources([Resource::Network]);

        assert!(constraints.interfaces.contains(&Interface::Position));
        assert_eq!(constraints.min_accuracy, AccuracyLevel::Street);
        assert!(constraints.require_updates);
        assert_eq!(
            constraints.allowed_resources,
            BTreeSet::from([Resource::Network])
        );
    }
}
