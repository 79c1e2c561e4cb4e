//! A loaded provider and its acceptance predicate.

use std::collections::BTreeSet;

use geoclue_bus::ObjectPath;

use crate::connectivity::{ConnectivityStatus, SharedConnectivity};
use crate::descriptor::ProviderDescriptor;
use crate::error::{ProviderError, Result};
use crate::source::DescriptorSource;
use crate::types::{AccuracyLevel, Capability, Constraints, Interface, Resource};

/// One backend known to the master
#[derive(Debug, Clone)]
pub struct ProviderRecord {
    id: String,
    name: String,
    service: String,
    path: ObjectPath,
    accuracy: AccuracyLevel,
    interfaces: BTreeSet<Interface>,
    provides: BTreeSet<Capability>,
    requires: BTreeSet<Resource>,
    connectivity: SharedConnectivity,
}

impl ProviderRecord {
    /// Build a record from an already parsed descriptor
    pub fn from_descriptor(
        id: impl Into<String>,
        descriptor: ProviderDescriptor,
        connectivity: SharedConnectivity,
    ) -> Result<Self> {
        let id = id.into();
        let path = ObjectPath::new(descriptor.path).map_err(|e| ProviderError::InvalidDescriptor {
            id: id.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            id,
            name: descriptor.name,
            service: descriptor.service,
            path,
            accuracy: descriptor.accuracy,
            interfaces: descriptor.interfaces,
            provides: descriptor.provides,
            requires: descriptor.requires,
            connectivity,
        })
    }

    /// Read, parse and validate descriptor `id` from `source`
    pub fn load(
        source: &dyn DescriptorSource,
        id: &str,
        connectivity: SharedConnectivity,
    ) -> Result<Self> {
        let text = source.read(id)?;
        let descriptor = ProviderDescriptor::from_toml(id, &text)?;
        Self::from_descriptor(id, descriptor, connectivity)
    }

    /// Whether this provider satisfies every constraint
    ///
    /// All four must hold: each requested interface is implemented, the
    /// expected accuracy reaches the minimum, updates are provided when
    /// required, and every resource the provider needs is allowed.
    pub fn is_good(&self, constraints: &Constraints) -> bool {
        constraints.interfaces.is_subset(&self.interfaces)
            && self.accuracy >= constraints.min_accuracy
            && (!constraints.require_updates || self.can_update())
            && self.requires.is_subset(&constraints.allowed_resources)
    }

    /// Descriptor identifier this record was loaded from
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    pub fn accuracy(&self) -> AccuracyLevel {
        self.accuracy
    }

    pub fn interfaces(&self) -> &BTreeSet<Interface> {
        &self.interfaces
    }

    pub fn requires(&self) -> &BTreeSet<Resource> {
        &self.requires
    }

    pub fn can_update(&self) -> bool {
        self.provides.contains(&Capability::Updates)
    }

    pub fn is_cacheable(&self) -> bool {
        self.provides.contains(&Capability::Cacheable)
    }

    /// Current status of the shared connectivity source
    pub fn connectivity_status(&self) -> ConnectivityStatus {
        self.connectivity.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::StaticConnectivity;
    use rstest::rstest;

    fn record(
        accuracy: AccuracyLevel,
        interfaces: &[Interface],
        provides: &[Capability],
        requires: &[Resource],
    ) -> ProviderRecord {
        let descriptor = ProviderDescriptor {
            name: "Test".to_string(),
            service: "org.example.Provider".to_string(),
            path: "/org/example/Provider".to_string(),
            accuracy,
            interfaces: interfaces.iter().copied().collect(),
            provides: provides.iter().copied().collect(),
            requires: requires.iter().copied().collect(),
        };
        ProviderRecord::from_descriptor(
            "test",
            descriptor,
            StaticConnectivity::shared(ConnectivityStatus::Online),
        )
        .unwrap()
    }

    #[test]
    fn test_any_accepts_everything() {
        let gps = record(
            AccuracyLevel::Detailed,
            &[Interface::Position, Interface::Velocity],
            &[Capability::Updates],
            &[Resource::Gps],
        );
        assert!(gps.is_good(&Constraints::any()));
        assert!(gps.can_update());
        assert!(!gps.is_cacheable());
        assert_eq!(gps.connectivity_status(), ConnectivityStatus::Online);
    }

    #[rstest]
    #[case::interface_missing(Constraints::any().with_interface(Interface::Address), false)]
    #[case::interface_present(Constraints::any().with_interface(Interface::Position), true)]
    #[case::accuracy_too_low(Constraints::any().with_min_accuracy(AccuracyLevel::Street), false)]
    #[case::accuracy_equal(Constraints::any().with_min_accuracy(AccuracyLevel::Locality), true)]
    #[case::updates_missing(Constraints::any().with_updates(true), false)]
    #[case::resource_forbidden(Constraints::any().with_allowed_resources([Resource::Gps]), false)]
    #[case::resource_allowed(Constraints::any().with_allowed_resources([Resource::Network]), true)]
    fn test_predicate(#[case] constraints: Constraints, #[case] expected: bool) {
        let hostip = record(
            AccuracyLevel::Locality,
            &[Interface::Position],
            &[Capability::Cacheable],
            &[Resource::Network],
        );
        assert_eq!(hostip.is_good(&constraints), expected);
    }

    #[test]
    fn test_invalid_path_rejected() {
        let descriptor = ProviderDescriptor {
            name: "Test".to_string(),
            service: "org.example.Provider".to_string(),
            path: "relative/path".to_string(),
            accuracy: AccuracyLevel::None,
            interfaces: [Interface::Position].into_iter().collect(),
            provides: BTreeSet::new(),
            requires: BTreeSet::new(),
        };
        let result = ProviderRecord::from_descriptor(
            "bad",
            descriptor,
            StaticConnectivity::shared(ConnectivityStatus::Unknown),
        );
        assert!(matches!(result, Err(ProviderError::InvalidDescriptor { .. })));
    }
}
